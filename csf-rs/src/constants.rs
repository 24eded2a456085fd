//! Element, attribute and model key names.
//!
//! The same string serves as XML local name and as management model key.

/// Subsystem element hosting the configuration fragment.
pub const SUBSYSTEM: &str = "subsystem";

/// Default subsystem name used in addresses.
pub const ELYTRON: &str = "elytron";

/// Container element for credential security factories.
pub const CREDENTIAL_SECURITY_FACTORIES: &str = "credential-security-factories";

/// Kerberos factory element and resource type.
pub const KERBEROS_SECURITY_FACTORY: &str = "kerberos-security-factory";

pub const NAME: &str = "name";
pub const PRINCIPAL: &str = "principal";
pub const PATH: &str = "path";
pub const RELATIVE_TO: &str = "relative-to";
pub const SERVER: &str = "server";
pub const MINIMUM_REMAINING_LIFETIME: &str = "minimum-remaining-lifetime";
pub const REQUEST_LIFETIME: &str = "request-lifetime";
pub const DEBUG: &str = "debug";
pub const MECHANISM_OIDS: &str = "mechanism-oids";

/// Operation name key of a model operation.
pub const OP: &str = "operation-name";

/// Address key of a model operation.
pub const OP_ADDR: &str = "address";

/// The add operation.
pub const ADD: &str = "add";

/// GSS-API indefinite lifetime, used as the request lifetime default.
pub const INDEFINITE_LIFETIME: i32 = i32::MAX;

/// Marker key for expressions in the JSON form of a model.
pub const EXPRESSION_VALUE: &str = "EXPRESSION_VALUE";
