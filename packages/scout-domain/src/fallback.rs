use crate::Candidate;

/// Fixed, always-renderable results served when the whole search pipeline fails.
pub fn fallback_candidates() -> Vec<Candidate> {
	let mut polygon = Candidate::new("1", "MATIC", "Polygon");

	polygon.rank = 1;
	polygon.description = "Ethereum scaling solution offering faster and cheaper transactions, \
		with a broad DeFi and NFT ecosystem."
		.to_string();
	polygon.circulating_supply = "8.00B".to_string();
	polygon.total_supply = "10.00B".to_string();
	polygon.logo = "M".to_string();
	polygon.whitepaper_url = "https://polygon.technology/papers/pol-whitepaper".to_string();
	polygon.twitter_url = "https://twitter.com/0xPolygon".to_string();
	polygon.website = "https://polygon.technology".to_string();
	polygon.contract_address = Some("0x7D1AfA7B718fb893dB30A3aBc0Cfc608AaCfeBB0".to_string());
	polygon.market_cap = Some("$8.2B".to_string());
	polygon.volume_24h = Some("$450M".to_string());
	polygon.price_change_24h = Some(5.2);
	polygon.price = Some(0.85);

	let mut chainlink = Candidate::new("2", "LINK", "Chainlink");

	chainlink.rank = 2;
	chainlink.description = "Decentralized oracle network supplying reliable real-world data to \
		smart contracts; core DeFi infrastructure."
		.to_string();
	chainlink.circulating_supply = "556.8M".to_string();
	chainlink.total_supply = "1.00B".to_string();
	chainlink.logo = "L".to_string();
	chainlink.whitepaper_url = "https://link.smartcontract.com/whitepaper".to_string();
	chainlink.twitter_url = "https://twitter.com/chainlink".to_string();
	chainlink.website = "https://chain.link".to_string();
	chainlink.contract_address = Some("0x514910771AF9Ca656af840dff83E8264EcF986CA".to_string());
	chainlink.market_cap = Some("$12.5B".to_string());
	chainlink.volume_24h = Some("$680M".to_string());
	chainlink.price_change_24h = Some(-2.1);
	chainlink.price = Some(22.45);

	vec![polygon, chainlink]
}
