//! Fund catalog and related types

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Identifier of an ownership fund. The set is closed; every asset in a fund
/// references exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundId {
    Cha10,
    Tra10,
    Bhph,
    Caps,
    Cos10,
    Disabled,
}

impl Display for FundId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                FundId::Cha10 => "cha10",
                FundId::Tra10 => "tra10",
                FundId::Bhph => "bhph",
                FundId::Caps => "caps",
                FundId::Cos10 => "cos10",
                FundId::Disabled => "disabled",
            }
        )
    }
}

impl FromStr for FundId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cha10" => Ok(FundId::Cha10),
            "tra10" => Ok(FundId::Tra10),
            "bhph" => Ok(FundId::Bhph),
            "caps" => Ok(FundId::Caps),
            "cos10" => Ok(FundId::Cos10),
            "disabled" => Ok(FundId::Disabled),
            _ => Err(anyhow::anyhow!("Unknown fund id: {}", s)),
        }
    }
}

/// Owning party of a fund, used by the visibility rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundOwner {
    PartnerOne,
    PartnerTwo,
    BothPartners,
    External,
    NotApplicable,
}

impl Display for FundOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                FundOwner::PartnerOne => "Partner One",
                FundOwner::PartnerTwo => "Partner Two",
                FundOwner::BothPartners => "Both Partners",
                FundOwner::External => "External",
                FundOwner::NotApplicable => "N/A",
            }
        )
    }
}

/// Immutable reference data describing a single fund.
#[derive(Debug, Clone)]
pub struct Fund {
    pub id: FundId,
    pub name: &'static str,
    pub description: &'static str,
    pub owner: FundOwner,
    pub fee_percentage: f64,
}

/// The closed set of funds. Built once at startup and passed by reference;
/// there is no mutable global.
#[derive(Debug, Clone)]
pub struct FundCatalog {
    funds: Vec<Fund>,
}

impl FundCatalog {
    pub fn standard() -> Self {
        FundCatalog {
            funds: vec![
                Fund {
                    id: FundId::Cha10,
                    name: "Charleston (Partner One)",
                    description: "Fund managed by Partner One for Charleston area vehicles",
                    owner: FundOwner::PartnerOne,
                    fee_percentage: 10.0,
                },
                Fund {
                    id: FundId::Tra10,
                    name: "Trade-in (Partner Two)",
                    description: "Fund managed by Partner Two for trade-in vehicles",
                    owner: FundOwner::PartnerTwo,
                    fee_percentage: 10.0,
                },
                Fund {
                    id: FundId::Bhph,
                    name: "Buy Here Pay Here",
                    description: "Joint ownership fund for in-house financed vehicles",
                    owner: FundOwner::BothPartners,
                    fee_percentage: 0.0,
                },
                Fund {
                    id: FundId::Caps,
                    name: "Capital Shares",
                    description: "Shared investment fund with equal ownership",
                    owner: FundOwner::BothPartners,
                    fee_percentage: 0.0,
                },
                Fund {
                    id: FundId::Cos10,
                    name: "Consignment 10%",
                    description: "Consignment vehicles with 10% fee structure",
                    owner: FundOwner::External,
                    fee_percentage: 10.0,
                },
                Fund {
                    id: FundId::Disabled,
                    name: "Disabled",
                    description: "Inactive or disabled vehicles",
                    owner: FundOwner::NotApplicable,
                    fee_percentage: 0.0,
                },
            ],
        }
    }

    pub fn get(&self, id: FundId) -> &Fund {
        // Construction is private and standard() covers every FundId variant.
        self.funds
            .iter()
            .find(|f| f.id == id)
            .expect("catalog contains every fund id")
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fund> {
        self.funds.iter()
    }

    pub fn len(&self) -> usize {
        self.funds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funds.is_empty()
    }
}

/// Maps a parsed document's deal type onto the fund a new asset starts in.
pub fn fund_for_deal_type(deal_type: &str) -> FundId {
    match deal_type {
        "BHPH Financed" => FundId::Bhph,
        "Cash" => FundId::Caps,
        _ => FundId::Cos10,
    }
}
