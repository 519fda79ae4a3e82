use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Heart disease prediction API server", long_about = None)]
pub struct Args {
    /// Address to bind the HTTP listener on.
    #[arg(long, default_value = "0.0.0.0", env = "CARDIO_BIND_ADDR")]
    pub bind_addr: String,

    /// Port for the prediction API.
    #[arg(short, long, default_value_t = 8000, env = "CARDIO_PORT")]
    pub port: u16,
}
