use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

const PORT: &str = "PORT";

pub const DEFAULT_PORT: u16 = 8000;

pub fn get_port() -> Option<u16> {
    std::env::var(PORT).ok().and_then(|res| res.parse().ok())
}

const HOST: &str = "HOST";

pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0));

pub fn get_host() -> Option<IpAddr> {
    std::env::var(HOST).ok().and_then(|res| res.parse().ok())
}

const DB_PATH: &str = "PULSEWATCH_DB";

pub fn get_db_path() -> Option<PathBuf> {
    std::env::var(DB_PATH)
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
}
