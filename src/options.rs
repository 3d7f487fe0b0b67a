use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(about = "Payment request processor - run options")]
pub struct RunOptions {
    #[structopt(
        long = "skip-settlement-loop",
        help = "Set to serve the api without scanning the chain"
    )]
    pub skip_settlement_loop: bool,

    #[structopt(
        long = "http-threads",
        help = "Number of threads to use for the server",
        default_value = "2"
    )]
    pub http_threads: u64,

    #[structopt(
        long = "http-port",
        help = "Port number of the server",
        default_value = "8080"
    )]
    pub http_port: u16,

    #[structopt(
        long = "http-addr",
        help = "Bind address of the server",
        default_value = "127.0.0.1"
    )]
    pub http_addr: String,

    #[structopt(long = "debug", help = "Enabled debug endpoint for the server")]
    pub debug: bool,
}

#[derive(StructOpt)]
#[structopt(about = "Single settlement cycle options")]
pub struct SettleNowOptions {
    #[structopt(
        short = "c",
        long = "chain-name",
        help = "Limit the cycle to one configured chain"
    )]
    pub chain_name: Option<String>,
}

#[derive(StructOpt)]
#[structopt(about = "Create payment request options")]
pub struct CreateRequestOptions {
    #[structopt(short = "c", long = "chain-name", default_value = "base")]
    pub chain_name: String,

    #[structopt(short = "r", long = "requester", help = "Requester (payee) address")]
    pub requester: String,

    #[structopt(
        short = "a",
        long = "amount",
        help = "Amount (decimal, full precision, i.e. 0.01)"
    )]
    pub amount: rust_decimal::Decimal,

    #[structopt(long = "caption", help = "Optional free-text caption")]
    pub caption: Option<String>,
}

#[derive(StructOpt)]
#[structopt(about = "Payment request settlement processor")]
pub enum PaymentCommands {
    #[structopt(about = "Start the settlement engine and the http api")]
    Run {
        #[structopt(flatten)]
        run_options: RunOptions,
    },
    #[structopt(about = "Run one settlement cycle and exit")]
    SettleNow {
        #[structopt(flatten)]
        settle_now_options: SettleNowOptions,
    },
    #[structopt(about = "Insert a payment request from the command line")]
    CreateRequest {
        #[structopt(flatten)]
        create_request_options: CreateRequestOptions,
    },
}

#[derive(StructOpt)]
pub struct PaymentOptions {
    #[structopt(subcommand)]
    pub commands: PaymentCommands,
}
