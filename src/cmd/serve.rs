use anyhow::Result;

use owlstream::addon;
use owlstream::{Config, Diagnostics};

pub async fn cmd_serve(mut config: Config, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.bind = bind;
    }
    addon::serve(&config, Diagnostics::default()).await
}
