/// Router Module Index
///
/// Routes are split by access level, and the access control is applied to each module
/// as a whole by the router assembly in `lib.rs`.

/// Routes open to anonymous clients. Listings personalize their answer through an
/// optional `AuthUser` when a session is present.
pub mod public;

/// Routes behind the `AuthUser` middleware. Any signed-in account.
pub mod authenticated;

/// Routes of the company area, nested under `/company`. Authenticated like the module
/// above; the company kind is checked by every handler.
pub mod company;
