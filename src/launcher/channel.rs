//! Transmit-mode selection and per-channel parameter validation.
use std::{path::PathBuf, str::FromStr};

use tracing::warn;

use crate::{cli::Arguments, lib::errors::ValidationError};

/// Channel selected with `-m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitMode {
    Server,
    Email,
    File,
}

impl TransmitMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransmitMode::Server => "server",
            TransmitMode::Email => "email",
            TransmitMode::File => "file",
        }
    }
}

impl FromStr for TransmitMode {
    type Err = ValidationError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.to_ascii_uppercase().as_str() {
            "SERVER" => Ok(TransmitMode::Server),
            "EMAIL" => Ok(TransmitMode::Email),
            "FILE" => Ok(TransmitMode::File),
            other => Err(ValidationError::InvalidTransmitMode {
                token: other.to_string(),
            }),
        }
    }
}

/// Which server receives a `SERVER` transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerTarget {
    /// Hosted hub addressed by customer name.
    Customer(String),
    /// Explicit server with its connection options.
    Explicit {
        server: String,
        port: u16,
        use_ssl: bool,
        base_directory: Option<String>,
        repository: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerChannel {
    pub target: ServerTarget,
    pub purge_sent_sessions: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub user: String,
    pub password: Option<String>,
}

/// Mail transport for an `EMAIL` transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailTransport {
    /// Use the configured default mail server.
    Default,
    Explicit {
        server: String,
        port: u16,
        use_ssl: bool,
        credentials: Option<SmtpCredentials>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailChannel {
    pub destination: Option<String>,
    pub from: Option<String>,
    pub transport: EmailTransport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChannel {
    pub path: PathBuf,
}

/// Exactly one channel per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransmissionChannel {
    Server(ServerChannel),
    Email(EmailChannel),
    File(FileChannel),
}

impl TransmissionChannel {
    pub fn mode(&self) -> TransmitMode {
        match self {
            TransmissionChannel::Server(_) => TransmitMode::Server,
            TransmissionChannel::Email(_) => TransmitMode::Email,
            TransmissionChannel::File(_) => TransmitMode::File,
        }
    }
}

/// Validated request handed to the packaging collaborator. Only sessions not
/// yet sent are packaged; `mark_as_sent` records them once delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmissionRequest {
    pub channel: TransmissionChannel,
    pub mark_as_sent: bool,
}

impl TransmissionRequest {
    pub fn new(channel: TransmissionChannel) -> Self {
        Self {
            channel,
            mark_as_sent: true,
        }
    }
}

/// Resolve the transmit-mode token and its channel flags into a request.
pub fn resolve(token: &str, args: &Arguments) -> Result<TransmissionRequest, ValidationError> {
    let channel = match token.parse::<TransmitMode>()? {
        TransmitMode::Server => TransmissionChannel::Server(resolve_server(args)?),
        TransmitMode::Email => TransmissionChannel::Email(resolve_email(args)),
        TransmitMode::File => TransmissionChannel::File(resolve_file(args)?),
    };
    Ok(TransmissionRequest::new(channel))
}

fn resolve_server(args: &Arguments) -> Result<ServerChannel, ValidationError> {
    let purge_sent_sessions = non_empty(args.purge_sent_sessions.as_deref())
        .map(|raw| parse_bool_or_default("purgeSentSessions", raw))
        .unwrap_or(false);

    let target = if let Some(customer) = non_empty(args.customer.as_deref()) {
        ServerTarget::Customer(customer.to_string())
    } else if let Some(server) = non_empty(args.server.as_deref()) {
        ServerTarget::Explicit {
            server: server.to_string(),
            port: parse_port_or_default(args.port.as_deref()),
            use_ssl: non_empty(args.ssl.as_deref())
                .map(|raw| parse_bool_or_default("ssl", raw))
                .unwrap_or(false),
            base_directory: args.directory.clone(),
            repository: args.repository.clone(),
        }
    } else {
        return Err(ValidationError::MissingServerInfo);
    };

    Ok(ServerChannel {
        target,
        purge_sent_sessions,
    })
}

fn resolve_email(args: &Arguments) -> EmailChannel {
    let transport = match non_empty(args.server.as_deref()) {
        None => EmailTransport::Default,
        Some(server) => {
            let credentials = non_empty(args.user.as_deref()).map(|user| SmtpCredentials {
                user: user.to_string(),
                password: args.password.clone(),
            });
            EmailTransport::Explicit {
                server: server.to_string(),
                port: parse_port_or_default(args.port.as_deref()),
                use_ssl: non_empty(args.ssl.as_deref())
                    .map(|raw| parse_bool_or_default("ssl", raw))
                    .unwrap_or(false),
                credentials,
            }
        }
    };

    EmailChannel {
        destination: args.destination.clone(),
        from: args.from.clone(),
        transport,
    }
}

fn resolve_file(args: &Arguments) -> Result<FileChannel, ValidationError> {
    let path = non_empty(args.destination.as_deref()).ok_or(ValidationError::MissingFileInfo)?;
    Ok(FileChannel {
        path: PathBuf::from(path),
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Unparsable, out-of-range or absent ports read as 0 (transport default).
fn parse_port_or_default(raw: Option<&str>) -> u16 {
    let Some(raw) = raw else {
        return 0;
    };
    match raw.trim().parse::<i64>() {
        Ok(port) => u16::try_from(port).unwrap_or_else(|_| {
            warn!(
                target: "diag_packager::channel",
                flag = "port",
                value = raw,
                "Port is outside 0-65535; using the default"
            );
            0
        }),
        Err(_) => {
            warn!(
                target: "diag_packager::channel",
                flag = "port",
                value = raw,
                "Port could not be interpreted as a number; using the default"
            );
            0
        }
    }
}

/// Case-insensitive `true`/`false`; anything else reads as false.
fn parse_bool_or_default(flag: &'static str, raw: &str) -> bool {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("true") {
        true
    } else if value.eq_ignore_ascii_case("false") {
        false
    } else {
        warn!(
            target: "diag_packager::channel",
            flag,
            value = raw,
            "Flag could not be interpreted as true/false; using false"
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Arguments {
        Arguments::default()
    }

    #[test]
    fn transmit_mode_is_case_insensitive() {
        assert_eq!("server".parse::<TransmitMode>(), Ok(TransmitMode::Server));
        assert_eq!("EMAIL".parse::<TransmitMode>(), Ok(TransmitMode::Email));
        assert_eq!("FiLe".parse::<TransmitMode>(), Ok(TransmitMode::File));
    }

    #[test]
    fn unknown_mode_is_rejected_regardless_of_flags() {
        let args = Arguments {
            destination: Some("out.zip".into()),
            customer: Some("Contoso".into()),
            ..args()
        };
        assert_eq!(
            resolve("bogus", &args),
            Err(ValidationError::InvalidTransmitMode {
                token: "BOGUS".into()
            })
        );
    }

    #[test]
    fn file_requires_destination() {
        assert_eq!(resolve("file", &args()), Err(ValidationError::MissingFileInfo));

        let empty = Arguments {
            destination: Some(String::new()),
            ..args()
        };
        assert_eq!(resolve("file", &empty), Err(ValidationError::MissingFileInfo));
    }

    #[test]
    fn file_with_destination_resolves() {
        let args = Arguments {
            destination: Some("out.zip".into()),
            ..args()
        };
        let request = resolve("file", &args).expect("file resolves");
        assert_eq!(
            request.channel,
            TransmissionChannel::File(FileChannel {
                path: PathBuf::from("out.zip")
            })
        );
        assert!(request.mark_as_sent);
    }

    #[test]
    fn server_requires_customer_or_server() {
        let blank = Arguments {
            customer: Some(String::new()),
            server: Some(String::new()),
            ..args()
        };
        assert_eq!(
            resolve("server", &blank),
            Err(ValidationError::MissingServerInfo)
        );
        assert_eq!(
            resolve("server", &args()),
            Err(ValidationError::MissingServerInfo)
        );
    }

    #[test]
    fn customer_wins_over_explicit_server() {
        let args = Arguments {
            customer: Some("Contoso".into()),
            server: Some("hub.internal".into()),
            port: Some("8443".into()),
            purge_sent_sessions: Some("TRUE".into()),
            ..args()
        };
        let request = resolve("server", &args).expect("server resolves");
        assert_eq!(
            request.channel,
            TransmissionChannel::Server(ServerChannel {
                target: ServerTarget::Customer("Contoso".into()),
                purge_sent_sessions: true,
            })
        );
    }

    #[test]
    fn explicit_server_reads_connection_options() {
        let args = Arguments {
            server: Some("hub.internal".into()),
            port: Some("8443".into()),
            ssl: Some("true".into()),
            directory: Some("loupe".into()),
            repository: Some("main".into()),
            ..args()
        };
        let request = resolve("server", &args).expect("server resolves");
        assert_eq!(
            request.channel,
            TransmissionChannel::Server(ServerChannel {
                target: ServerTarget::Explicit {
                    server: "hub.internal".into(),
                    port: 8443,
                    use_ssl: true,
                    base_directory: Some("loupe".into()),
                    repository: Some("main".into()),
                },
                purge_sent_sessions: false,
            })
        );
    }

    #[test]
    fn garbled_port_and_ssl_fall_back_to_defaults() {
        let args = Arguments {
            server: Some("hub.internal".into()),
            port: Some("eighty".into()),
            ssl: Some("yes".into()),
            purge_sent_sessions: Some("maybe".into()),
            ..args()
        };
        let request = resolve("server", &args).expect("garbled options are not fatal");
        match request.channel {
            TransmissionChannel::Server(ServerChannel {
                target: ServerTarget::Explicit { port, use_ssl, .. },
                purge_sent_sessions,
            }) => {
                assert_eq!(port, 0);
                assert!(!use_ssl);
                assert!(!purge_sent_sessions);
            }
            other => panic!("unexpected channel: {other:?}"),
        }
    }

    #[test]
    fn port_outside_range_falls_back_to_default() {
        assert_eq!(parse_port_or_default(Some("70000")), 0);
        assert_eq!(parse_port_or_default(Some("-1")), 0);
        assert_eq!(parse_port_or_default(Some(" 8080 ")), 8080);
        assert_eq!(parse_port_or_default(None), 0);
    }

    #[test]
    fn email_without_server_uses_default_transport() {
        let args = Arguments {
            destination: Some("support@example.com".into()),
            from: Some("app@example.com".into()),
            user: Some("ignored".into()),
            ..args()
        };
        let request = resolve("email", &args).expect("email resolves");
        assert_eq!(
            request.channel,
            TransmissionChannel::Email(EmailChannel {
                destination: Some("support@example.com".into()),
                from: Some("app@example.com".into()),
                transport: EmailTransport::Default,
            })
        );
    }

    #[test]
    fn email_password_needs_user() {
        let without_user = Arguments {
            server: Some("smtp.example.com".into()),
            password: Some("secret".into()),
            ..args()
        };
        match resolve("email", &without_user).expect("resolves").channel {
            TransmissionChannel::Email(EmailChannel {
                transport: EmailTransport::Explicit { credentials, .. },
                ..
            }) => assert_eq!(credentials, None),
            other => panic!("unexpected channel: {other:?}"),
        }

        let with_user = Arguments {
            user: Some("mailer".into()),
            port: Some("587".into()),
            ..without_user
        };
        match resolve("email", &with_user).expect("resolves").channel {
            TransmissionChannel::Email(EmailChannel {
                transport:
                    EmailTransport::Explicit {
                        port, credentials, ..
                    },
                ..
            }) => {
                assert_eq!(port, 587);
                assert_eq!(
                    credentials,
                    Some(SmtpCredentials {
                        user: "mailer".into(),
                        password: Some("secret".into()),
                    })
                );
            }
            other => panic!("unexpected channel: {other:?}"),
        }
    }

    #[test]
    fn email_is_permissive_about_addresses() {
        let request = resolve("email", &args()).expect("no required email fields");
        assert_eq!(request.channel.mode(), TransmitMode::Email);
    }

    #[test]
    fn resolution_is_repeatable() {
        let args = Arguments {
            server: Some("hub.internal".into()),
            port: Some("80".into()),
            ..args()
        };
        assert_eq!(resolve("SERVER", &args), resolve("server", &args));
    }
}
