use std::time::Duration;

use mongodb::{
    Client, Database,
    bson::{Document, doc},
    options::ClientOptions,
};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::error::{MongoDaoError, MongoResult};

const PING_ATTEMPTS: u32 = 5;
const FIRST_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Open the tournament database, retrying the first ping with exponential backoff.
///
/// Finalization needs multi-document transactions; a server that cannot run them is
/// accepted but reported once here.
pub async fn open_tournament_database(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut attempt = 1;
    let mut backoff = FIRST_BACKOFF;
    while let Err(source) = database.run_command(doc! { "ping": 1 }).await {
        if attempt == PING_ATTEMPTS {
            return Err(MongoDaoError::InitialPing {
                database: database_name.to_owned(),
                attempts: attempt,
                source,
            });
        }
        debug!(database = database_name, attempt, error = %source, "MongoDB ping failed, retrying");
        sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
        attempt += 1;
    }

    match database.run_command(doc! { "hello": 1 }).await {
        Ok(reply) if supports_transactions(&reply) => {}
        Ok(_) => warn!(
            database = database_name,
            "MongoDB is a standalone server, finalizing matches will fail"
        ),
        Err(err) => debug!(error = %err, "MongoDB topology unknown"),
    }

    Ok((client, database))
}

/// Replica set members and mongos routers run transactions; standalone servers do not.
fn supports_transactions(hello: &Document) -> bool {
    hello.contains_key("setName") || hello.get_str("msg").is_ok_and(|msg| msg == "isdbgrid")
}
