//! Trust Wallet deep-link builder
//!
//! Pure string formatting: builds a link that opens the 1inch dApp browser
//! inside Trust Wallet with the given token pre-selected for a USDT swap.
//! Nothing here touches the ledger or any network.

use url::Url;

const TRUST_WALLET_OPEN_URL: &str = "https://link.trustwallet.com/open_url";

/// Ethereum's coin id in the Trust Wallet registry
const ETHEREUM_COIN_ID: &str = "60";

/// Build a buy deep link for the given token contract address.
///
/// `amount_usd` is a UI reference only; the swap amount is chosen inside
/// the wallet app.
pub fn buy_link(token_address: &str, _amount_usd: f64) -> String {
    let swap_url = format!(
        "https://app.1inch.io/#/1/simple/swap/USDT/{}",
        token_address
    );

    let mut link = Url::parse(TRUST_WALLET_OPEN_URL).expect("static URL is valid");
    link.query_pairs_mut()
        .append_pair("coin_id", ETHEREUM_COIN_ID)
        .append_pair("url", &swap_url);
    link.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_link_format() {
        let link = buy_link("0x95aD61b0a150d79219dCF64E1E6Cc01f0B64C4cE", 0.0);
        assert!(link.starts_with("https://link.trustwallet.com/open_url?"));
        assert!(link.contains("coin_id=60"));
        // The embedded dApp URL must be percent-encoded
        assert!(link.contains("url=https%3A%2F%2Fapp.1inch.io"));
        assert!(link.contains("0x95aD61b0a150d79219dCF64E1E6Cc01f0B64C4cE"));
    }
}
