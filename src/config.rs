use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

/// Listing Lens - query real-estate listings over HTTP
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Listings file (.csv, .json or .parquet), re-read on every request
    #[arg(short, long, env = "LISTINGS_DATA", default_value = "cleaned_99acres.csv")]
    pub data: PathBuf,

    /// Address to bind
    #[arg(long, env = "LISTINGS_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "LISTINGS_PORT", default_value_t = 5000)]
    pub port: u16,
}

impl Args {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["listing-lens"]).unwrap();
        assert_eq!(args.port, 5000);
        assert_eq!(args.socket_addr().to_string(), "127.0.0.1:5000");
    }

    #[test]
    fn explicit_flags() {
        let args = Args::try_parse_from([
            "listing-lens",
            "--data",
            "listings.parquet",
            "--host",
            "0.0.0.0",
            "-p",
            "8080",
        ])
        .unwrap();
        assert_eq!(args.data, PathBuf::from("listings.parquet"));
        assert_eq!(args.socket_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn invalid_host_is_rejected() {
        assert!(Args::try_parse_from(["listing-lens", "--host", "not-an-ip"]).is_err());
    }
}
