//! Environment overrides: CDS_EXPLORER__CDSCTL__BINARY, CDS_EXPLORER__CDSRCS (comma separated), ...

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

pub const ENV_PREFIX: &str = "CDS_EXPLORER";

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("cdsrcs")
            .try_parsing(true),
    )
}
