//! 암호화폐 대시보드 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 시가총액 상위 10개 코인 보기
//! coindash markets --limit 10
//!
//! # 현재가 스냅샷 조회
//! coindash prices -i bitcoin,ethereum
//!
//! # 비트코인 7일 차트 시계열 (5분 캐시, --refresh로 강제 갱신)
//! coindash history -i bitcoin -d 7
//!
//! # 코인 검색
//! coindash search -q sol
//!
//! # 보유 내역 JSON 파일 평가
//! coindash portfolio -f portfolio.json
//! ```

use std::sync::Arc;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use coindash_core::{init_logging, AppConfig, Holding, PortfolioSummary};
use coindash_data::{CoinGeckoClient, CoinGeckoConfig, MarketDataService, MarketDataServiceConfig};

#[derive(Parser)]
#[command(name = "coindash")]
#[command(about = "Crypto dashboard CLI - CoinGecko 기반 시장 데이터 조회", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 시가총액 순 상위 시장 목록 보기
    Markets {
        /// 표시할 코인 수
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },

    /// 코인 id 집합의 현재가 스냅샷 조회
    Prices {
        /// 코인 id 목록 (쉼표로 구분, 예: bitcoin,ethereum)
        #[arg(short, long)]
        ids: String,
    },

    /// 코인 하나의 일수 기반 차트 시계열 조회
    History {
        /// 코인 id (예: bitcoin)
        #[arg(short, long)]
        id: String,

        /// 조회 기간 (일)
        #[arg(short, long, default_value = "7")]
        days: u32,

        /// 캐시를 비우고 강제로 다시 조회
        #[arg(long, default_value = "false")]
        refresh: bool,
    },

    /// 자유 텍스트 코인 검색
    Search {
        /// 검색어 (2자 이상)
        #[arg(short, long)]
        query: String,
    },

    /// 보유 내역 JSON 파일을 현재가로 평가
    Portfolio {
        /// 보유 내역 파일 (camelCase 필드 + ISO-8601 날짜의 JSON 배열)
        #[arg(short, long)]
        file: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 설정 파일이 없으면 기본값으로 동작
    let (config, load_error) = match AppConfig::load(&cli.config) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    init_logging(&config.logging).ok();
    if let Some(e) = load_error {
        warn!(path = %cli.config, error = %e, "설정 파일을 읽지 못해 기본값 사용");
    }

    let client = CoinGeckoClient::new(CoinGeckoConfig::from(&config.api));
    let service = MarketDataService::new(
        Arc::new(client),
        MarketDataServiceConfig::from(&config.api),
    );

    match cli.command {
        Commands::Markets { limit } => {
            let markets = service.top_markets(limit).await.map_err(print_and_raise)?;

            println!(
                "{:<4} {:<16} {:<8} {:>16} {:>10}",
                "순위", "이름", "심볼", "현재가(USD)", "24h(%)"
            );
            for entry in &markets {
                println!(
                    "{:<4} {:<16} {:<8} {:>16} {:>10}",
                    entry
                        .market_cap_rank
                        .map(|rank| rank.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    entry.name,
                    entry.symbol.to_uppercase(),
                    entry.current_price,
                    entry
                        .price_change_percentage_24h
                        .map(|pct| round2(pct).to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            info!(count = markets.len(), "시장 목록 조회 완료");
        }

        Commands::Prices { ids } => {
            let ids: Vec<String> = ids
                .split(',')
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect();

            let prices = service.price_snapshots(&ids).await.map_err(print_and_raise)?;

            for id in &ids {
                match prices.get(id) {
                    Some(snapshot) => println!(
                        "{:<16} {:>16} USD  {:>10}",
                        id,
                        snapshot.usd,
                        snapshot
                            .usd_24h_change
                            .map(|pct| format!("{}%", round2(pct)))
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    None => println!("{:<16} (시세 없음)", id),
                }
            }
        }

        Commands::History { id, days, refresh } => {
            if refresh {
                service.clear_history_cache().await;
            }

            let series = service.price_history(&id, days).await.map_err(print_and_raise)?;

            println!("{} / {}일 / {}개 점", id, days, series.prices.len());
            for point in &series.prices {
                println!("{}  {}", point.timestamp.format("%Y-%m-%d %H:%M"), point.value);
            }

            if let Some(latest) = series.latest_price() {
                println!("\n최근 가격: {} USD", latest.value);
            }
        }

        Commands::Search { query } => {
            let hits = service.search(&query).await.map_err(print_and_raise)?;

            if hits.is_empty() {
                println!("검색 결과 없음: {}", query);
            }
            for hit in &hits {
                println!(
                    "{:<16} {:<8} {}",
                    hit.id,
                    hit.symbol,
                    hit.market_cap_rank
                        .map(|rank| format!("#{}", rank))
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
        }

        Commands::Portfolio { file } => {
            let raw = std::fs::read_to_string(&file)?;
            let holdings: Vec<Holding> = serde_json::from_str(&raw)?;

            if holdings.is_empty() {
                println!("보유 내역이 비어 있습니다: {}", file);
                return Ok(());
            }

            // 중복 없는 코인 id 집합으로 배치 조회
            let mut ids: Vec<String> =
                holdings.iter().map(|h| h.coin_id.clone()).collect();
            ids.sort();
            ids.dedup();

            let prices = service.price_snapshots(&ids).await.map_err(print_and_raise)?;
            let summary = PortfolioSummary::from_holdings(holdings, &prices);

            println!(
                "{:<16} {:>12} {:>14} {:>14} {:>12}",
                "코인", "수량", "평가액", "손익", "손익률(%)"
            );
            for item in &summary.items {
                println!(
                    "{:<16} {:>12} {:>14} {:>14} {:>12}",
                    item.holding.coin_id,
                    item.holding.amount,
                    round2(item.current_value),
                    round2(item.profit),
                    round2(item.profit_percent),
                );
            }
            println!(
                "\n총 평가액: {} USD / 투자금: {} USD / 손익: {} ({}%)",
                round2(summary.total_value),
                round2(summary.total_invested),
                round2(summary.total_profit),
                round2(summary.total_profit_percent),
            );
        }
    }

    Ok(())
}

/// 출력용 소수 둘째 자리 반올림.
fn round2(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// 에러를 로그로 남기고 anyhow로 전파.
fn print_and_raise(err: coindash_data::MarketError) -> anyhow::Error {
    if err.is_retry_exhausted() {
        error!(error = %err, "재시도 한도 도달 - 잠시 후 다시 시도하세요");
    } else {
        error!(error = %err, "시장 데이터 조회 실패");
    }
    anyhow::Error::new(err)
}
