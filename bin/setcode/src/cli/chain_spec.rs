// This file is part of Setcode.
//
// Setcode is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Setcode is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Setcode.
// If not, see https://www.gnu.org/licenses/.

use anyhow::Context;
use config::{Config, File, FileFormat};
use paste::paste;
use setcode_types::chain::{ChainRegistry, ChainSpec};

/// Build the chain registry from the hardcoded specs plus an optional chain spec file.
///
/// A file entry replaces a hardcoded chain with the same id.
pub fn load_registry(file: &Option<String>) -> anyhow::Result<ChainRegistry> {
    let mut registry = ChainRegistry::default();
    for network in HARDCODED_CHAIN_SPECS {
        let spec = parse_chain_spec(File::from_str(
            get_hardcoded_chain_spec(network)?,
            FileFormat::Toml,
        ))
        .with_context(|| format!("invalid hardcoded chain spec {network}"))?;
        registry.insert(spec);
    }

    if let Some(file) = file {
        let spec = parse_chain_spec(File::with_name(file.as_str()))
            .with_context(|| format!("invalid chain spec file {file}"))?;
        registry.insert(spec);
    }
    Ok(registry)
}

fn parse_chain_spec<S>(source: S) -> anyhow::Result<ChainSpec>
where
    S: config::Source + Send + Sync + 'static,
{
    let c = Config::builder().add_source(source).build()?;
    match c.get::<u64>("id") {
        Ok(0) => anyhow::bail!("chain id must be non-zero"),
        Ok(_) => {}
        Err(_) => anyhow::bail!("chain id must be defined"),
    }
    Ok(c.try_deserialize()?)
}

macro_rules! define_hardcoded_chain_specs {
    ($($network:ident),+) => {
        paste! {
            $(
                const [< $network:upper _SPEC >]: &str = include_str!(concat!("../../chain_specs/", stringify!($network), ".toml"));
            )+

            fn get_hardcoded_chain_spec(network: &str) -> anyhow::Result<&'static str> {
                match network {
                    $(
                        stringify!($network) => Ok([< $network:upper _SPEC >]),
                    )+
                    _ => anyhow::bail!("unknown hardcoded network: {}", network),
                }
            }

            pub const HARDCODED_CHAIN_SPECS: &[&'static str] = &[$(stringify!($network),)+];
        }
    };
}

define_hardcoded_chain_specs!(sepolia);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardcoded_registry() {
        let registry = load_registry(&None).unwrap();
        let sepolia = registry.get(11155111).unwrap();
        assert_eq!(sepolia.name, "Sepolia");
        assert_eq!(sepolia.rpc_url, "https://api.zan.top/eth-sepolia");
        assert_eq!(
            sepolia.explorer_url.as_deref(),
            Some("https://sepolia.etherscan.io")
        );
    }

    #[test]
    fn test_unknown_network() {
        assert!(get_hardcoded_chain_spec("mainnet").is_err());
    }

    #[test]
    fn test_missing_id_rejected() {
        let res = parse_chain_spec(File::from_str(
            "name = \"Nameless\"\nrpc_url = \"http://localhost:8545\"",
            FileFormat::Toml,
        ));
        assert!(res.is_err());
    }

    #[test]
    fn test_partial_spec_uses_defaults() {
        let spec = parse_chain_spec(File::from_str(
            "name = \"Local\"\nid = 31337\nrpc_url = \"http://localhost:8545\"",
            FileFormat::Toml,
        ))
        .unwrap();
        assert_eq!(spec.id, 31337);
        assert_eq!(spec.native_currency_symbol, "ETH");
        assert_eq!(spec.explorer_url, None);
    }
}
