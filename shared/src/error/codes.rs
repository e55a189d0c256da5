//! Unified error codes for the store backend
//!
//! This module defines all error codes used across the server and frontend.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: User / address errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product / catalog errors
//! - 7xxx: Preorder errors
//! - 8xxx: Cart errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1005,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2002,

    // ==================== 3xxx: User / Address ====================
    /// User not found
    UserNotFound = 3001,
    /// Email is already registered
    EmailExists = 3002,
    /// Password too short
    PasswordTooShort = 3003,
    /// Address not found (or not owned by caller)
    AddressNotFound = 3101,

    // ==================== 4xxx: Order ====================
    /// Order not found (or not owned by caller)
    OrderNotFound = 4001,
    /// Cart is empty, nothing to order
    CartEmpty = 4002,
    /// Requested quantity exceeds available inventory
    InsufficientStock = 4003,
    /// Requested status change is not permitted from the current status
    InvalidStatusTransition = 4004,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Invalid payment method
    PaymentInvalidMethod = 5002,
    /// Payment record not found
    PaymentNotFound = 5003,

    // ==================== 6xxx: Product / Catalog ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product is inactive
    ProductInactive = 6002,
    /// Variant not found (missing, inactive, or wrong product)
    VariantNotFound = 6101,
    /// Variant SKU already exists
    SkuExists = 6102,
    /// Inventory record not found
    InventoryNotFound = 6201,
    /// Review not found
    ReviewNotFound = 6301,
    /// Review already exists for this user + product
    ReviewExists = 6302,
    /// Review rating out of range (1-5)
    ReviewInvalidRating = 6303,
    /// Wishlist item already exists
    WishlistItemExists = 6401,
    /// Wishlist item not found
    WishlistItemNotFound = 6402,

    // ==================== 7xxx: Preorder ====================
    /// Preorder not found (or not owned by caller)
    PreorderNotFound = 7001,
    /// Product inactive or preorders disabled
    PreorderNotAllowed = 7002,
    /// Expected stock date has passed; preorder window closed
    PreorderWindowClosed = 7003,
    /// Cumulative active preorder quantity would exceed the product cap
    PreorderLimitExceeded = 7004,
    /// Caller already holds an active preorder for this product + variant
    DuplicatePreorder = 7005,

    // ==================== 8xxx: Cart ====================
    /// Cart not found
    CartNotFound = 8001,
    /// Cart item not found
    CartItemNotFound = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // User / Address
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::EmailExists => "Email is already registered",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",
            ErrorCode::AddressNotFound => "Address not found",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::InvalidStatusTransition => "Status transition not permitted",

            // Payment
            ErrorCode::PaymentFailed => "Payment processing failed",
            ErrorCode::PaymentInvalidMethod => "Invalid payment method",
            ErrorCode::PaymentNotFound => "Payment record not found",

            // Product / Catalog
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInactive => "Product is inactive",
            ErrorCode::VariantNotFound => "Product variant not found",
            ErrorCode::SkuExists => "Variant SKU already exists",
            ErrorCode::InventoryNotFound => "Inventory record not found",
            ErrorCode::ReviewNotFound => "Review not found",
            ErrorCode::ReviewExists => "Review already exists for this product",
            ErrorCode::ReviewInvalidRating => "Review rating must be between 1 and 5",
            ErrorCode::WishlistItemExists => "Product is already in the wishlist",
            ErrorCode::WishlistItemNotFound => "Wishlist item not found",

            // Preorder
            ErrorCode::PreorderNotFound => "Preorder not found",
            ErrorCode::PreorderNotAllowed => "Product does not accept preorders",
            ErrorCode::PreorderWindowClosed => "Preorder window has closed",
            ErrorCode::PreorderLimitExceeded => "Preorder limit exceeded",
            ErrorCode::DuplicatePreorder => "An active preorder already exists for this product",

            // Cart
            ErrorCode::CartNotFound => "Cart not found",
            ErrorCode::CartItemNotFound => "Cart item not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            1 => ErrorCode::Unknown,
            2 => ErrorCode::ValidationFailed,
            3 => ErrorCode::NotFound,
            4 => ErrorCode::AlreadyExists,
            5 => ErrorCode::InvalidRequest,
            6 => ErrorCode::InvalidFormat,
            7 => ErrorCode::RequiredField,
            8 => ErrorCode::ValueOutOfRange,

            1001 => ErrorCode::NotAuthenticated,
            1002 => ErrorCode::InvalidCredentials,
            1003 => ErrorCode::TokenExpired,
            1004 => ErrorCode::TokenInvalid,
            1005 => ErrorCode::AccountDisabled,

            2001 => ErrorCode::PermissionDenied,
            2002 => ErrorCode::AdminRequired,

            3001 => ErrorCode::UserNotFound,
            3002 => ErrorCode::EmailExists,
            3003 => ErrorCode::PasswordTooShort,
            3101 => ErrorCode::AddressNotFound,

            4001 => ErrorCode::OrderNotFound,
            4002 => ErrorCode::CartEmpty,
            4003 => ErrorCode::InsufficientStock,
            4004 => ErrorCode::InvalidStatusTransition,

            5001 => ErrorCode::PaymentFailed,
            5002 => ErrorCode::PaymentInvalidMethod,
            5003 => ErrorCode::PaymentNotFound,

            6001 => ErrorCode::ProductNotFound,
            6002 => ErrorCode::ProductInactive,
            6101 => ErrorCode::VariantNotFound,
            6102 => ErrorCode::SkuExists,
            6201 => ErrorCode::InventoryNotFound,
            6301 => ErrorCode::ReviewNotFound,
            6302 => ErrorCode::ReviewExists,
            6303 => ErrorCode::ReviewInvalidRating,
            6401 => ErrorCode::WishlistItemExists,
            6402 => ErrorCode::WishlistItemNotFound,

            7001 => ErrorCode::PreorderNotFound,
            7002 => ErrorCode::PreorderNotAllowed,
            7003 => ErrorCode::PreorderWindowClosed,
            7004 => ErrorCode::PreorderLimitExceeded,
            7005 => ErrorCode::DuplicatePreorder,

            8001 => ErrorCode::CartNotFound,
            8002 => ErrorCode::CartItemNotFound,

            9001 => ErrorCode::InternalError,
            9002 => ErrorCode::DatabaseError,
            9003 => ErrorCode::NetworkError,
            9004 => ErrorCode::TimeoutError,
            9005 => ErrorCode::ConfigError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}
