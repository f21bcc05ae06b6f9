//! 포트폴리오 보유 내역 및 평가.
//!
//! 보유 내역은 camelCase 필드와 ISO-8601 날짜 문자열로 직렬화됩니다.
//! 대시보드가 저장해 둔 JSON 배열을 그대로 읽고 쓸 수 있는 형식입니다.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::market::PriceSnapshot;

/// 포트폴리오 보유 항목.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// 항목 식별자 (저장 시 부여된 불투명 문자열)
    pub id: String,
    /// 코인 식별자 (예: "bitcoin")
    pub coin_id: String,
    /// 티커 심볼
    pub symbol: String,
    /// 코인 이름
    pub name: String,
    /// 보유 수량
    pub amount: Decimal,
    /// 매수 단가
    pub purchase_price: Decimal,
    /// 매수 일시
    pub purchase_date: DateTime<Utc>,
}

/// 현재가가 반영된 보유 항목 평가.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingValuation {
    /// 평가 대상 보유 항목
    #[serde(flatten)]
    pub holding: Holding,
    /// 현재가 (시세 없음 = 0)
    pub current_price: Decimal,
    /// 현재 평가액
    pub current_value: Decimal,
    /// 매수 금액
    pub purchase_value: Decimal,
    /// 평가 손익
    pub profit: Decimal,
    /// 평가 손익률 (%)
    pub profit_percent: Decimal,
}

/// 포트폴리오 전체 요약.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    /// 총 평가액
    pub total_value: Decimal,
    /// 총 매수 금액
    pub total_invested: Decimal,
    /// 총 평가 손익
    pub total_profit: Decimal,
    /// 총 평가 손익률 (%)
    pub total_profit_percent: Decimal,
    /// 항목별 평가
    pub items: Vec<HoldingValuation>,
}

impl HoldingValuation {
    /// 보유 항목을 현재가로 평가합니다.
    ///
    /// 스냅샷에 해당 코인이 없으면 현재가 0으로 평가합니다.
    pub fn evaluate(holding: Holding, prices: &HashMap<String, PriceSnapshot>) -> Self {
        let current_price = prices
            .get(&holding.coin_id)
            .map(|snapshot| snapshot.usd)
            .unwrap_or(Decimal::ZERO);

        let current_value = holding.amount * current_price;
        let purchase_value = holding.amount * holding.purchase_price;
        let profit = current_value - purchase_value;
        let profit_percent = percent_of(profit, purchase_value);

        Self {
            holding,
            current_price,
            current_value,
            purchase_value,
            profit,
            profit_percent,
        }
    }
}

impl PortfolioSummary {
    /// 보유 내역 전체를 평가하고 합산합니다.
    pub fn from_holdings(
        holdings: Vec<Holding>,
        prices: &HashMap<String, PriceSnapshot>,
    ) -> Self {
        let items: Vec<HoldingValuation> = holdings
            .into_iter()
            .map(|holding| HoldingValuation::evaluate(holding, prices))
            .collect();

        let total_value: Decimal = items.iter().map(|item| item.current_value).sum();
        let total_invested: Decimal = items.iter().map(|item| item.purchase_value).sum();
        let total_profit = total_value - total_invested;
        let total_profit_percent = percent_of(total_profit, total_invested);

        Self {
            total_value,
            total_invested,
            total_profit,
            total_profit_percent,
            items,
        }
    }
}

/// 분모가 0이면 0%를 반환하는 비율 계산.
fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        (part / whole) * Decimal::from(100)
    }
}
