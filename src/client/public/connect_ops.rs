use super::Client;
use crate::commands;
use crate::resp::Reply;
use crate::Error;

#[cfg(doc)]
use super::ClientBuilder;

impl Client {
    /// Create a new [`Client`] and connect to a Disque broker.
    ///
    /// `DISQUE_PROVIDER` is read to get the name of the environment variable
    /// to get the address from (defaults to `DISQUE_URL`), and then that
    /// environment variable is read to get the broker address. If the latter
    /// environment variable is not defined, the connection will be made to
    /// `127.0.0.1:7711`.
    ///
    /// You can optionally use [`Client::connect_to`] and pass the address
    /// as an argument.
    pub async fn connect() -> Result<Client, Error> {
        Client::builder().connect().await
    }

    /// Connect to the Disque broker at this address.
    ///
    /// To tune pooling (e.g. `max_idle`), use [`ClientBuilder`] instead.
    pub async fn connect_to<A>(addr: A) -> Result<Client, Error>
    where
        A: AsRef<str>,
    {
        Client::builder().connect_to(addr).await
    }

    /// Checks broker liveness.
    ///
    /// Returns the broker's reply text verbatim (`PONG`).
    pub async fn ping(&self) -> Result<String, Error> {
        let mut conn = self.pool.acquire().await?;
        match conn.exec(&commands::ping()).await? {
            Reply::Simple(text) => Ok(text),
            _ => Err(Error::UnexpectedReply {
                msg: "PING reply is not a simple string",
            }),
        }
    }
}
