use anyhow::Result;

use sitekit_core::storage::KeyValueStore;
use sitekit_core::AppConfig;

use super::open_store;

pub fn status(config: &AppConfig) -> Result<()> {
    let store = open_store(config);
    let key = &config.cookie.storage_key;

    match store.get(key)? {
        Some(value) if value == "true" => println!("Cookies accepted ({} = {})", key, value),
        Some(value) => println!("Cookies not accepted ({} = {:?})", key, value),
        None => println!("Cookies not accepted ({} not set)", key),
    }
    println!("Store: {}", store.path().display());
    Ok(())
}

pub fn reset(config: &AppConfig) -> Result<()> {
    let store = open_store(config);
    store.remove(&config.cookie.storage_key)?;
    println!("Cleared cookie acknowledgement in {}", store.path().display());
    Ok(())
}
