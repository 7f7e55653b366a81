use clap::{Parser, ValueEnum};
use perpetual_trade_batch::builders::TradeOperationBuilder;
use perpetual_trade_batch::config::TradeConfig;
use perpetual_trade_batch::errors::Result;
use perpetual_trade_batch::submission::{ConfirmationType, SendOptions};
use perpetual_trade_batch::utils::{parse_address, parse_signed_amount};
use alloy::primitives::{Address, I256};
use std::str::FromStr;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Confirmation {
    Hash,
    Confirmed,
    Both,
    Simulate,
}

impl From<Confirmation> for ConfirmationType {
    fn from(value: Confirmation) -> Self {
        match value {
            Confirmation::Hash => ConfirmationType::Hash,
            Confirmation::Confirmed => ConfirmationType::Confirmed,
            Confirmation::Both => ConfirmationType::Both,
            Confirmation::Simulate => ConfirmationType::Simulate,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum LegKind {
    Liquidation,
    Deleverage,
}

/// `kind:maker:taker:amount`, e.g. `liquidation:0xaa..:0xbb..:-1000`
#[derive(Clone, Debug)]
struct LegArg {
    kind: LegKind,
    maker: Address,
    taker: Address,
    amount: I256,
}

impl FromStr for LegArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [kind, maker, taker, amount] = parts.as_slice() else {
            return Err(format!("expected kind:maker:taker:amount, got {}", s));
        };

        let kind = match *kind {
            "liquidation" | "liquidate" => LegKind::Liquidation,
            "deleverage" => LegKind::Deleverage,
            other => return Err(format!("unsupported leg kind {}", other)),
        };

        Ok(Self {
            kind,
            maker: parse_address(maker).map_err(|e| e.to_string())?,
            taker: parse_address(taker).map_err(|e| e.to_string())?,
            amount: parse_signed_amount(amount).map_err(|e| e.to_string())?,
        })
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about = "Settle a batch of liquidations and deleverages", long_about = None)]
struct Args {
    #[clap(long = "leg", required = true, help = "Trade leg as kind:maker:taker:amount; repeat for a batch")]
    legs: Vec<LegArg>,

    #[clap(long, help = "Reject partial execution of every leg")]
    all_or_nothing: bool,

    #[clap(long, value_enum, default_value = "simulate", help = "How far to follow the submission")]
    confirmation: Confirmation,

    #[clap(long, env = "PERP_GAS_OVERRIDE", help = "Gas limit for this settlement only")]
    gas: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("perpetual_trade_batch=info".parse().map_err(anyhow::Error::from)?)
                .add_directive("settle=info".parse().map_err(anyhow::Error::from)?),
        )
        .compact()
        .with_file(false)
        .with_line_number(false)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = TradeConfig::from_env()?;
    let mut operation = TradeOperationBuilder::from_config(&config)?.build()?;

    for leg in &args.legs {
        match leg.kind {
            LegKind::Liquidation => {
                operation.append_liquidation(leg.maker, leg.taker, leg.amount, args.all_or_nothing)?;
            }
            LegKind::Deleverage => {
                operation.append_deleverage(leg.maker, leg.taker, leg.amount, args.all_or_nothing)?;
            }
        }
    }

    let settlement = operation.settlement()?;
    tracing::info!(
        batch_id = %operation.id(),
        accounts = settlement.accounts().len(),
        trades = settlement.trades().len(),
        "Settlement prepared"
    );

    let mut options = SendOptions::new(args.confirmation.into());
    if let Some(gas) = args.gas {
        options = options.with_gas(gas);
    }

    let result = operation.commit(Some(&options)).await?;
    let rendered = serde_json::to_string_pretty(&result).map_err(anyhow::Error::from)?;
    println!("{}", rendered);

    Ok(())
}
