//! Default configuration values - single source of truth

/// Default output directory for generated query files
pub const OUTPUT_DIR: &str = "queries";

/// Default directory holding the `{kind}.sql.tmpl` templates
pub const TEMPLATES_DIR: &str = "pkg/tool/templates";

/// Whether to use the compiled-in templates by default
pub const BUILTIN_TEMPLATES: bool = false;

/// Whether to write every table into a single `queries.sql` by default
pub const SINGLE_FILE: bool = false;

/// Whether to run in dry-run mode by default
pub const DRY_RUN: bool = false;

/// Config file looked up in the working directory when none is given
pub const CONFIG_FILE_NAME: &str = "querygen";

/// Prefix for environment variable overrides (QUERYGEN_OUTPUT_DIR, ...)
pub const ENV_PREFIX: &str = "QUERYGEN";
