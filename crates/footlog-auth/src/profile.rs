use super::*;

/// Identity asserted by a login provider after a successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub email: String,
    pub name: String,
    pub gender: Gender,
    pub origin: Origin,
}
