use checkout_engine::application::checkout::CheckoutSession;
use checkout_engine::domain::cart::Cart;
use checkout_engine::domain::ports::{ClockRef, Collaborators};
use checkout_engine::infrastructure::clock::{FixedClock, SystemClock};
use checkout_engine::infrastructure::in_memory::{
    InMemoryOrderGateway, StaticTaxTable, WeightBasedShipping,
};
use checkout_engine::interfaces::csv::cart_reader::CartReader;
use checkout_engine::interfaces::csv::receipt_writer::{Receipt, ReceiptWriter};
use checkout_engine::interfaces::json::form_reader::CheckoutForm;
use chrono::NaiveDate;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Cart CSV file (product_id,name,unit_price,quantity,weight)
    cart: PathBuf,

    /// Checkout form JSON file (shipping, billing, sameAsShipping, payment)
    #[arg(long)]
    form: PathBuf,

    /// Storefront API root. Requires the 'http-client' feature.
    #[arg(long, env = "CHECKOUT_API_BASE")]
    api_base: Option<String>,

    /// Date used for card expiration checks (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    today: Option<NaiveDate>,
}

fn collaborators(api_base: Option<String>, clock: ClockRef) -> Collaborators {
    let in_memory = |clock| Collaborators {
        tax: Arc::new(StaticTaxTable::us_base_rates()),
        shipping: Arc::new(WeightBasedShipping::default()),
        orders: Arc::new(InMemoryOrderGateway::new()),
        clock,
    };

    match api_base {
        #[cfg(feature = "http-client")]
        Some(base) => {
            let api = Arc::new(checkout_engine::infrastructure::http::HttpStorefrontApi::new(base));
            Collaborators {
                tax: api.clone(),
                shipping: api.clone(),
                orders: api,
                clock,
            }
        }
        #[cfg(not(feature = "http-client"))]
        Some(_) => {
            eprintln!(
                "WARNING: Storefront API requested via --api-base, but 'http-client' feature is not enabled. Falling back to in-memory collaborators."
            );
            in_memory(clock)
        }
        None => in_memory(clock),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let clock: ClockRef = match cli.today {
        Some(date) => Arc::new(FixedClock(date)),
        None => Arc::new(SystemClock),
    };

    let cart_file = File::open(&cli.cart).into_diagnostic()?;
    let mut cart = Cart::new();
    for line in CartReader::new(cart_file).lines() {
        if let Err(e) = line.and_then(|line| cart.add(line)) {
            eprintln!("Error reading cart line: {}", e);
        }
    }

    let form_file = File::open(&cli.form).into_diagnostic()?;
    let form = CheckoutForm::from_reader(form_file).into_diagnostic()?;

    let mut session = CheckoutSession::new(cart, collaborators(cli.api_base, clock));
    let (_, shipping) = session.open();
    let tax = form.replay(&mut session).into_diagnostic()?;
    session.settle(tax, shipping).await;

    let pricing = *session.pricing();
    let order_id = session.submit().await.into_diagnostic()?;

    let receipt = Receipt::new(&order_id, &pricing, session.payment());
    let stdout = io::stdout();
    let mut writer = ReceiptWriter::new(stdout.lock());
    writer.write_receipt(&receipt).into_diagnostic()?;

    Ok(())
}
