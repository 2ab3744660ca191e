//! Constants used throughout the appenv codebase

// Key transform
pub const KEY_DELIMITER: char = '/';
pub const ENV_NAME_SEPARATOR: char = '_';

// Content type token that marks a secret indirection. Matched as a substring
// because the store appends a charset suffix that varies.
pub const SECRET_REFERENCE_MARKER: &str = "keyvaultref";
pub const SECRET_REFERENCE_CONTENT_TYPE: &str =
    "application/vnd.microsoft.appconfig.keyvaultref+json;charset=utf-8";

// Path segment that prefixes every addressable secret
pub const SECRETS_PATH_SEGMENT: &str = "secrets";

// Wire protocol versions
pub const CONFIG_STORE_API_VERSION: &str = "1.0";
pub const SECRET_STORE_API_VERSION: &str = "7.4";

// The configuration store spells "no label" as a NUL character
pub const NULL_LABEL: &str = "\0";

// Environment variable names
pub const APPENV_ENDPOINT_VAR: &str = "APPENV_ENDPOINT";
pub const APPENV_LABEL_VAR: &str = "APPENV_LABEL";
pub const APPENV_KEYS_VAR: &str = "APPENV_KEYS";
pub const APPENV_MAX_CONCURRENCY_VAR: &str = "APPENV_MAX_CONCURRENCY";
pub const APPENV_ACCESS_TOKEN_VAR: &str = "APPENV_ACCESS_TOKEN";
pub const APPENV_VAULT_ACCESS_TOKEN_VAR: &str = "APPENV_VAULT_ACCESS_TOKEN";
pub const APPENV_CONFIG_VAR: &str = "APPENV_CONFIG";
pub const APPENV_ALLOWED_VAULT_HOSTS_VAR: &str = "APPENV_ALLOWED_VAULT_HOSTS";

// Settings file
pub const DEFAULT_SETTINGS_FILENAME: &str = "appenv.json";

// Engine defaults
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

// Hosts the secret store token may be sent to. A leading dot matches any
// subdomain; anything else must match the host exactly.
pub const DEFAULT_ALLOWED_VAULT_HOSTS: &[&str] = &[".vault.azure.net"];
