use super::print_json;
use anyhow::Result;
use dbagent_runtime::DatabaseServer;

pub fn list(server: &DatabaseServer) -> Result<()> {
    print_json(&server.get_stalks()?)
}

pub fn show(server: &DatabaseServer, name: &str) -> Result<()> {
    print_json(&server.get_stalk(name)?)
}
