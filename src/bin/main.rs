use std::net::TcpListener as StdTcpListener;
use std::os::fd::FromRawFd;

use clap::Parser;
use eyre::bail;
use listenfd::ListenFd;
use tokio::net::TcpListener;

use testserver::infrastructure::server_impl::server::serve;
use testserver::AnyResult;

/// HTTP server that echoes requests back, for HTTP client integration tests.
#[derive(Debug, Parser)]
struct Cli {
    /// By default only bind to loopback.
    #[arg(long, default_value = "127.0.0.1")]
    bind_addr: String,

    /// If not specified an ephemeral port will be used.
    #[arg(long, default_value_t = 0)]
    port: u16,

    /// A socket FD to use for accept() instead of binding a new one.
    #[arg(long)]
    fd: Option<i32>,

    /// Terminate TLS in front of the echo core.
    #[arg(long)]
    use_tls: bool,
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.use_tls {
        bail!("TLS termination is not supported; run behind a terminating proxy instead");
    }

    let std_listener = acquire_listener(&cli)?;
    std_listener.set_nonblocking(true)?;
    let listener = TcpListener::from_std(std_listener)?;

    let port = listener.local_addr()?.port();
    // The test harness scrapes this exact line from stderr to learn the
    // ephemeral port.
    eprintln!("Test server listening on port {port}");

    tokio::select! {
        result = serve(listener) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, closing listener");
            Ok(())
        }
    }
}

/// Adopts a pre-opened socket when one was handed to us, binds otherwise.
fn acquire_listener(cli: &Cli) -> AnyResult<StdTcpListener> {
    if let Some(fd) = cli.fd {
        // SAFETY: ownership of the descriptor is transferred to us by the
        // parent process that opened it.
        return Ok(unsafe { StdTcpListener::from_raw_fd(fd) });
    }

    let mut env_fds = ListenFd::from_env();
    if let Some(listener) = env_fds.take_tcp_listener(0)? {
        return Ok(listener);
    }

    Ok(StdTcpListener::bind((cli.bind_addr.as_str(), cli.port))?)
}
