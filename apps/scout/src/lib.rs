pub mod state;

use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use color_eyre::eyre;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::state::AppState;
use scout_client::RegisterRequest;
use scout_domain::{Candidate, SearchFilters};
use scout_service::{ResultSource, SearchController, SearchOutcome, SearchRequest, SearchSnapshot};

#[derive(Debug, Parser)]
#[command(
	version = scout_cli::VERSION,
	rename_all = "kebab",
	styles = scout_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Search tokens with a free-text description.
	Search(SearchArgs),
	/// Search interactively. Typed lines are debounced and repeats come from the cache.
	Shell,
	/// Show backend details for one token.
	Token { id: String },
	/// Generate a research report for one token.
	Report {
		id: String,
		/// Save the report into this folder ("default" when no folder is given).
		#[arg(long)]
		save: bool,
		#[arg(long, value_name = "FOLDER_ID")]
		folder: Option<String>,
	},
	Login {
		#[arg(long)]
		email: String,
		#[arg(long)]
		password: String,
	},
	Register {
		#[arg(long)]
		email: String,
		#[arg(long)]
		username: String,
		#[arg(long)]
		password: String,
		#[arg(long)]
		confirm_password: String,
	},
	Logout,
	/// Show the signed-in user.
	Whoami,
	/// List recent searches.
	History {
		#[arg(long)]
		clear: bool,
	},
}

#[derive(Debug, clap::Args)]
pub struct SearchArgs {
	pub query: String,
	#[arg(long, value_name = "N")]
	pub top_k: Option<u32>,
	#[arg(long = "category", value_name = "CATEGORY")]
	pub categories: Vec<String>,
	#[arg(long = "chain", value_name = "CHAIN")]
	pub chains: Vec<String>,
	#[arg(long, value_name = "USD")]
	pub min_market_cap: Option<f64>,
	#[arg(long, value_name = "USD")]
	pub max_market_cap: Option<f64>,
	#[arg(long, value_name = "USD")]
	pub min_volume: Option<f64>,
}
impl SearchArgs {
	fn filters(&self) -> SearchFilters {
		SearchFilters {
			market_cap_min: self.min_market_cap,
			market_cap_max: self.max_market_cap,
			volume_24h_min: self.min_volume,
			categories: Some(self.categories.clone()),
			chains: Some(self.chains.clone()),
		}
		.normalized()
	}

	fn request(&self) -> SearchRequest {
		let req = SearchRequest::new(&self.query).with_filters(self.filters()).manual();

		match self.top_k {
			Some(top_k) => req.with_top_k(top_k),
			None => req,
		}
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = scout_config::load(&args.config)?;

	init_tracing(&config)?;

	tracing::debug!(
		environment = %config.service.environment,
		api_base_url = %config.api.base_url,
		storage_path = %config.storage.path.display(),
		"Scout starting."
	);

	let state = AppState::new(config)?;

	match args.command {
		Command::Search(search) => run_search(&state, &search).await,
		Command::Shell => run_shell(&state).await,
		Command::Token { id } => {
			let token = find_token(&state, &id).await?;

			print_candidate(&token);

			Ok(())
		},
		Command::Report { id, save, folder } => {
			let token = find_token(&state, &id).await?;
			let report = state.reports.generate_report(&token).await;

			println!("{}", report.content);

			if report.tokens_used == 0 {
				println!("\n(basic report: AI generation was unavailable)");
			}
			if save || folder.is_some() {
				let saved = state.preferences.save_report(&report, folder.as_deref(), None, None)?;

				println!("\nSaved as {:?} in folder {}.", saved.title, saved.folder_id);
			}

			Ok(())
		},
		Command::Login { email, password } => {
			let session = state.session.login(&email, &password).await?;

			println!("Signed in as {} <{}>.", session.user.username, session.user.email);

			Ok(())
		},
		Command::Register { email, username, password, confirm_password } => {
			let req = RegisterRequest { email, username, password, confirm_password };
			let session = state.session.register(&req).await?;

			println!("Registered {} <{}>.", session.user.username, session.user.email);

			Ok(())
		},
		Command::Logout => {
			state.session.logout().await?;

			println!("Signed out.");

			Ok(())
		},
		Command::Whoami => {
			match state.session.current_user() {
				Some(user) => println!("{} <{}> (id {})", user.username, user.email, user.id),
				None => println!("Not signed in."),
			}

			Ok(())
		},
		Command::History { clear } => {
			if clear {
				state.preferences.clear_history()?;

				println!("Search history cleared.");

				return Ok(());
			}

			for (index, query) in state.preferences.history()?.iter().enumerate() {
				println!("{:>2}. {query}", index + 1);
			}

			Ok(())
		},
	}
}

async fn run_search(state: &AppState, args: &SearchArgs) -> color_eyre::Result<()> {
	let outcome = state.pipeline.search(&args.request()).await;

	if outcome.source != ResultSource::Empty {
		state.preferences.add_history(&outcome.query)?;
	}

	print_outcome(&outcome);

	Ok(())
}

async fn run_shell(state: &AppState) -> color_eyre::Result<()> {
	let controller = SearchController::new(
		state.pipeline.clone(),
		Duration::from_millis(state.config.search.debounce_ms),
	);
	let mut updates = controller.subscribe();
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	let mut printed = 0;

	println!("Type a query. :refresh re-runs it, :clear resets, :quit exits.");

	loop {
		tokio::select! {
			line = lines.next_line() => {
				let Some(line) = line? else {
					break;
				};

				match line.trim() {
					":quit" | ":q" => break,
					":refresh" => {
						controller.refresh().await;
					},
					":clear" => {
						controller.clear_search();
						controller.clear_cache();

						println!("Cleared.");
					},
					query => controller.set_query(query),
				}
			},
			changed = updates.changed() => {
				if changed.is_err() {
					break;
				}

				let snapshot = updates.borrow_and_update().clone();

				if snapshot.is_loading || !snapshot.has_searched || snapshot.sequence == printed {
					continue;
				}

				printed = snapshot.sequence;

				state.preferences.add_history(&snapshot.query)?;
				print_snapshot(&snapshot);
			},
		}
	}

	Ok(())
}

async fn find_token(state: &AppState, id: &str) -> color_eyre::Result<Candidate> {
	state.pipeline.token_details(id).await.ok_or_else(|| eyre::eyre!("Token {id} was not found."))
}

fn print_outcome(outcome: &SearchOutcome) {
	if let Some(err) = outcome.error.as_ref() {
		eprintln!("Search failed: {err}");

		if !outcome.results.is_empty() {
			eprintln!("Showing fallback results.");
		}
	}
	for degradation in &outcome.degradations {
		eprintln!("Note: {} degraded: {}", degradation.stage.as_str(), degradation.reason);
	}

	print_results(&outcome.results, outcome.error.is_some());

	println!(
		"\n{} result(s) in {} ms{}.",
		outcome.metrics.result_count,
		outcome.metrics.duration.as_millis(),
		if outcome.metrics.cache_hit { " (cached)" } else { "" }
	);
}

fn print_snapshot(snapshot: &SearchSnapshot) {
	if let Some(err) = snapshot.error.as_ref() {
		eprintln!("Search failed: {err}");
	}

	print_results(&snapshot.results, snapshot.error.is_some());

	if snapshot.source == Some(ResultSource::Cache) {
		println!("(cached)");
	}
}

fn print_results(results: &[Candidate], failed: bool) {
	if results.is_empty() && !failed {
		println!("No results.");
	}

	for candidate in results {
		let market_cap = candidate.market_cap.as_deref().unwrap_or("-");
		let change = candidate
			.price_change_24h
			.map(|change| format!("{change:+.1}%"))
			.unwrap_or_else(|| "-".to_string());

		println!(
			"{:>3}. {:<8} {:<24} mcap {:<10} 24h {:<8} id {}",
			candidate.rank, candidate.symbol, candidate.name, market_cap, change, candidate.id
		);
	}
}

fn print_candidate(token: &Candidate) {
	let optional = |value: Option<&str>| value.unwrap_or("-").to_string();

	println!("{} ({})  id {}", token.name, token.symbol, token.id);

	if !token.description.is_empty() {
		println!("\n{}\n", token.description);
	}

	println!("Market cap:         {}", optional(token.market_cap.as_deref()));
	println!("24h volume:         {}", optional(token.volume_24h.as_deref()));
	println!("Circulating supply: {}", token.circulating_supply);
	println!("Total supply:       {}", token.total_supply);
	println!("Contract:           {}", optional(token.contract_address.as_deref()));
	println!("Website:            {}", token.website);
	println!("Whitepaper:         {}", token.whitepaper_url);
	println!("Twitter:            {}", token.twitter_url);
}

fn init_tracing(config: &scout_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use scout_service::SearchMode;

	#[test]
	fn one_shot_search_is_manual() {
		let args = Args::try_parse_from([
			"scout",
			"-c",
			"scout.toml",
			"search",
			"cheap defi",
			"--top-k",
			"5",
			"--category",
			"defi",
			"--category",
			" defi ",
			"--chain",
			"ethereum",
		])
		.expect("parse failed");
		let Command::Search(search) = args.command else {
			panic!("Expected the search command.");
		};
		let req = search.request();

		assert_eq!(req.mode, SearchMode::Manual);
		assert_eq!(req.top_k, Some(5));
		assert_eq!(req.filters.categories, Some(vec!["defi".to_string()]));
		assert_eq!(req.filters.chains, Some(vec!["ethereum".to_string()]));
	}

	#[test]
	fn search_defaults_and_shell() {
		let args = Args::try_parse_from(["scout", "-c", "x.toml", "search", "nft"])
			.expect("parse failed");
		let Command::Search(search) = args.command else {
			panic!("Expected the search command.");
		};

		assert_eq!(search.request().top_k, None);
		assert_eq!(search.request().filters, SearchFilters::default());
		assert!(
			Args::try_parse_from(["scout", "-c", "x.toml", "search", "nft", "--cached"]).is_err()
		);

		let args = Args::try_parse_from(["scout", "-c", "x.toml", "shell"]).expect("parse failed");

		assert!(matches!(args.command, Command::Shell));
	}

	#[test]
	fn register_takes_confirmation() {
		let args = Args::try_parse_from([
			"scout",
			"-c",
			"x.toml",
			"register",
			"--email",
			"a@b.io",
			"--username",
			"a",
			"--password",
			"p",
			"--confirm-password",
			"p",
		])
		.expect("parse failed");

		assert!(matches!(args.command, Command::Register { .. }));
	}
}
