/// Collection holding user documents.
pub const USERS_COLLECTION: &str = "AspNetUsers";

/// Collection holding role documents.
pub const ROLES_COLLECTION: &str = "AspNetRoles";

/// Symbolic connection name used when none is configured explicitly.
pub const DEFAULT_CONNECTION: &str = "DefaultConnection";

/// Document field carrying the primary key.
pub const ID_FIELD: &str = "_id";

pub mod object_id {

    pub const BYTE_LEN: usize = 12;

    pub const HEX_LEN: usize = 24;
}
