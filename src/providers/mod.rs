//! Provider implementations

pub mod binance;
pub mod binance_dex;
pub mod bitfinex;
pub mod bitmex;
pub mod coinmarketcap;
pub mod cryptocompare;
pub mod deribit;

pub use binance::BinanceApi;
pub use binance_dex::BinanceDexApi;
pub use bitfinex::BitfinexApi;
pub use bitmex::BitmexApi;
pub use coinmarketcap::CoinMarketCapApi;
pub use cryptocompare::CryptoCompareApi;
pub use deribit::DeribitApi;

#[cfg(test)]
mod tests {
    use crate::endpoint::ParamLocation;
    use crate::provider::Provider;
    use std::collections::HashSet;

    fn placeholders(path: &str) -> Vec<(String, bool)> {
        path.split('{')
            .skip(1)
            .filter_map(|chunk| chunk.split_once('}').map(|(name, _)| name))
            .map(|name| match name.strip_prefix('/') {
                Some(name) => (name.to_string(), false),
                None => (name.to_string(), true),
            })
            .collect()
    }

    #[test]
    fn test_operation_names_are_unique() {
        for provider in Provider::all() {
            let mut seen = HashSet::new();
            for endpoint in provider.api().endpoints() {
                assert!(seen.insert(endpoint.name), "{provider}: {}", endpoint.name);
            }
        }
    }

    #[test]
    fn test_operation_suffix_matches_method() {
        for provider in Provider::all() {
            for endpoint in provider.api().endpoints() {
                let suffix = format!("_{}", endpoint.method);
                assert!(endpoint.name.ends_with(&suffix), "{provider}: {}", endpoint.name);
            }
        }
    }

    #[test]
    fn test_placeholders_are_declared() {
        for provider in Provider::all() {
            for endpoint in provider.api().endpoints() {
                let mut in_template = placeholders(endpoint.path);
                in_template.sort();

                let mut declared: Vec<(String, bool)> = endpoint
                    .parameters
                    .iter()
                    .filter(|p| p.location == ParamLocation::Path)
                    .map(|p| (p.name.to_string(), p.required))
                    .collect();
                declared.sort();

                assert_eq!(in_template, declared, "{provider}: {}", endpoint.name);
            }
        }
    }

    #[test]
    fn test_paths_are_rooted() {
        for provider in Provider::all() {
            for endpoint in provider.api().endpoints() {
                assert!(endpoint.path.starts_with('/'), "{provider}: {}", endpoint.name);
                assert!(!endpoint.path.contains('?'), "{provider}: {}", endpoint.name);
            }
        }
    }

    #[test]
    fn test_unauthenticated_providers_have_no_private_operations() {
        let api = Provider::BinanceDex.api();
        assert!(api.endpoints().iter().all(|e| !e.auth_required));
        assert!(!api.signer().requires_secret(&api.endpoints()[0]));
    }
}
