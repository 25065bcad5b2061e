#![cfg(feature = "cli")]
use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine;
use clap::{ArgAction, Parser, Subcommand};
use tracing::{info, warn, Level};

use wvlicense::cdm::{Cdm, CdmOptions};
use wvlicense::codec::RawMessage;
use wvlicense::device::DeviceIdentity;
use wvlicense::padding::UnpadPolicy;
use wvlicense::pssh::InitData;
use wvlicense::recorder::TracingRecorder;
use wvlicense::transport::{HttpTransport, LicenseEndpoint};

#[derive(Parser)]
#[command(name = "wvlicense", version, about = "Widevine license client")]
struct Cli {
    #[arg(short = 'd', long = "debug", action = ArgAction::SetTrue)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Request a license for init data and print the decrypted keys.
    ///
    /// The license server must accept the raw signed request as the POST body
    /// and return the raw signed license.
    License {
        /// License server URL.
        address: String,
        /// Base64 init data (PSSH box).
        init_data: String,
        /// Client identification blob.
        #[arg(short = 'c', long = "client-id", required_unless_present = "wvd")]
        client_id: Option<PathBuf>,
        /// Device private key (PEM or DER).
        #[arg(short = 'k', long = "private-key", required_unless_present = "wvd")]
        private_key: Option<PathBuf>,
        /// WVD device container, instead of --client-id and --private-key.
        #[arg(short = 'w', long = "wvd", conflicts_with_all = ["client_id", "private_key"])]
        wvd: Option<PathBuf>,
        /// Service certificate for privacy mode.
        #[arg(long = "certificate")]
        certificate: Option<PathBuf>,
        /// Authorization header value sent with every request.
        #[arg(short = 'H', long = "authorization")]
        authorization: Option<String>,
        /// Encrypt the client id (fetches the service certificate if none given).
        #[arg(short = 'p', long = "privacy", action = ArgAction::SetTrue)]
        privacy: bool,
        /// Reject keys with implausible padding instead of keeping them as is.
        #[arg(long = "strict-padding", action = ArgAction::SetTrue)]
        strict_padding: bool,
    },
    /// Print the field tree of a binary protobuf message.
    Inspect {
        /// Base64 or hex encoded message.
        data: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::License {
            address,
            init_data,
            client_id,
            private_key,
            wvd,
            certificate,
            authorization,
            privacy,
            strict_padding,
        } => {
            let identity = load_identity(
                wvd.as_deref(),
                private_key.as_deref(),
                client_id.as_deref(),
                certificate.as_deref(),
            )?;
            let mut endpoint = LicenseEndpoint::new(address);
            if let Some(authorization) = authorization {
                endpoint = endpoint.with_authorization(authorization);
            }
            let options = CdmOptions {
                privacy_mode: privacy,
                unpad: if strict_padding {
                    UnpadPolicy::Strict
                } else {
                    UnpadPolicy::Permissive
                },
            };
            run_license(identity, &endpoint, &init_data, options)
        }
        Commands::Inspect { data } => run_inspect(&data),
    }
}

fn load_identity(
    wvd: Option<&Path>,
    private_key: Option<&Path>,
    client_id: Option<&Path>,
    certificate: Option<&Path>,
) -> anyhow::Result<DeviceIdentity> {
    let identity = match (wvd, private_key, client_id) {
        (Some(wvd), _, _) => {
            let data = std::fs::read(wvd).context("Failed to read WVD")?;
            DeviceIdentity::from_wvd(&data).context("Failed to load WVD")?
        }
        (None, Some(private_key), Some(client_id)) => {
            DeviceIdentity::from_files(private_key, client_id, None)
                .context("Failed to load device identity")?
        }
        _ => anyhow::bail!("Either --wvd or both --private-key and --client-id are required"),
    };

    match certificate {
        Some(path) => {
            let certificate = std::fs::read(path).context("Failed to read certificate")?;
            Ok(identity.with_certificate(certificate))
        }
        None => Ok(identity),
    }
}

fn run_license(
    mut identity: DeviceIdentity,
    endpoint: &LicenseEndpoint,
    init_data: &str,
    options: CdmOptions,
) -> anyhow::Result<()> {
    info!("[+] Loaded device identity");

    let init_data = InitData::from_base64(init_data).context("Invalid init data")?;
    info!(
        "[+] Parsed init data (system {}, {} byte payload)",
        init_data.system_id(),
        init_data.payload().len()
    );

    let transport = HttpTransport::new()?;

    if options.privacy_mode && identity.certificate().is_none() {
        let certificate = Cdm::new(&identity)
            .with_recorder(TracingRecorder::default())
            .request_service_certificate(&transport, endpoint)
            .context("Failed to get service certificate")?;
        identity = identity.with_certificate(certificate);
        info!("[+] Set service privacy certificate");
    }

    let cdm = Cdm::new(&identity)
        .with_options(options)
        .with_recorder(TracingRecorder::default());
    let batch = cdm
        .acquire_keys(&transport, endpoint, init_data.as_bytes())
        .context("License exchange failed")?;
    info!("[+] License parsed successfully");

    for key in &batch.keys {
        info!("{}", key);
    }
    for err in &batch.rejected {
        warn!("[-] {}", err);
    }
    Ok(())
}

fn run_inspect(data: &str) -> anyhow::Result<()> {
    let data = data.trim();
    let bytes = match hex::decode(data) {
        Ok(bytes) => bytes,
        Err(_) => base64::engine::general_purpose::STANDARD
            .decode(data)
            .context("Input is neither hex nor base64")?,
    };
    let message = RawMessage::decode(&bytes).context("Input is not a protobuf message")?;
    println!("{}", message.dump());
    Ok(())
}
