/// Authentication and authorization
///
/// - `password`: Argon2id credential hashing and verification
/// - `session`: opaque session tokens bound to account ids
/// - `principal`: the request principal and the admin/authenticated gate

pub mod password;
pub mod principal;
pub mod session;
