// SPDX-License-Identifier: MPL-2.0
//! Command-line front-end.
//!
//! `--lang` plays the role of the dashboard's `?lang=` query override: it wins
//! over the stored preference for this invocation only and is never
//! persisted. `locale <code>` is the explicit, persisted switch.

use crate::client::ApiClientBuilder;
use crate::config;
use crate::error::{ApiError, Error, Result};
use crate::i18n::LocaleManager;
use crate::pages::Page;
use crate::storage::{FileStore, KeyValueStore, MemoryStore, ACCESS_KEY_STORAGE};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// GET an API path and print the JSON body.
    Get { path: String, query: Option<String> },
    /// Store an access key.
    Login { key: String },
    /// Remove the stored access key.
    Logout,
    /// Show, or switch and persist, the UI language.
    Locale { code: Option<String> },
    /// List dashboard pages with localized labels.
    Pages,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flags {
    pub lang: Option<String>,
    pub base_url: Option<String>,
    pub config_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub command: Command,
}

impl Flags {
    pub fn from_env() -> Result<Self> {
        Self::parse(pico_args::Arguments::from_env())
    }

    pub fn from_vec(args: Vec<OsString>) -> Result<Self> {
        Self::parse(pico_args::Arguments::from_vec(args))
    }

    fn parse(mut args: pico_args::Arguments) -> Result<Self> {
        let help = args.contains(["-h", "--help"]);
        let lang = args.opt_value_from_str("--lang")?;
        let base_url = args.opt_value_from_str("--base-url")?;
        let config_dir = args.opt_value_from_str("--config-dir")?;
        let data_dir = args.opt_value_from_str("--data-dir")?;

        let mut flags = Self {
            lang,
            base_url,
            config_dir,
            data_dir,
            command: Command::Help,
        };
        if help {
            return Ok(flags);
        }

        flags.command = match args.subcommand()?.as_deref() {
            None | Some("help") => Command::Help,
            Some("get") => Command::Get {
                path: args.free_from_str()?,
                query: args.opt_free_from_str()?,
            },
            Some("login") => Command::Login {
                key: args.free_from_str()?,
            },
            Some("logout") => Command::Logout,
            Some("locale") => Command::Locale {
                code: args.opt_free_from_str()?,
            },
            Some("pages") => Command::Pages,
            Some(other) => return Err(Error::Usage(format!("unknown command: {other}"))),
        };

        let rest = args.finish();
        if !rest.is_empty() {
            return Err(Error::Usage(format!("unexpected arguments: {rest:?}")));
        }

        Ok(flags)
    }
}

fn open_store(data_dir: Option<PathBuf>) -> Arc<dyn KeyValueStore> {
    match FileStore::open_with_override(data_dir) {
        Some(store) => Arc::new(store),
        None => {
            tracing::warn!("no data directory available, nothing will be persisted");
            Arc::new(MemoryStore::new())
        }
    }
}

/// Executes `flags` and returns the text to print.
pub async fn run(flags: Flags) -> Result<String> {
    let store = open_store(flags.data_dir.clone());

    let mut builder = LocaleManager::builder().store(store.clone());
    if let Some(lang) = &flags.lang {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("lang", lang)
            .finish();
        builder = builder.query(query);
    }
    let i18n = Arc::new(builder.build());

    match flags.command {
        Command::Get { path, query } => {
            let (config, warning) = config::load_with_override(flags.config_dir);
            if let Some(key) = warning {
                tracing::warn!("{}", i18n.tr(&key));
            }
            let mut api = config.api;
            if let Some(base_url) = flags.base_url {
                api.base_url = base_url;
            }

            let client = ApiClientBuilder::from_config(&api)
                .store(store)
                .i18n(i18n.clone())
                .build()?;
            let mut access_key_required = client.events().subscribe();

            let target = match query {
                Some(query) => format!("{path}?{query}"),
                None => path,
            };
            match client.get_json::<serde_json::Value>(&target).await {
                Ok(body) => {
                    Ok(serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string()))
                }
                Err(err) => match access_key_required.try_recv() {
                    Ok(event) => Err(ApiError::new(format!(
                        "{}: {}",
                        i18n.tr("notification-access-key-required"),
                        event.message
                    ))
                    .into()),
                    Err(_) => Err(err.into()),
                },
            }
        }
        Command::Login { key } => {
            store.set(ACCESS_KEY_STORAGE, key.trim())?;
            Ok(i18n.tr("cli-login-saved"))
        }
        Command::Logout => {
            store.remove(ACCESS_KEY_STORAGE)?;
            Ok(i18n.tr("cli-logout-done"))
        }
        Command::Locale { code: None } => Ok(format!(
            "{}: {}",
            i18n.tr("cli-locale-current"),
            i18n.current_locale()
        )),
        Command::Locale { code: Some(code) } => {
            let applied = i18n.set_locale(&code, true);
            Ok(format!("{}: {}", i18n.tr("cli-locale-changed"), applied))
        }
        Command::Pages => {
            let lines: Vec<String> = Page::ALL
                .into_iter()
                .map(|page| format!("{:<10} {} - {}", page.path(), page.label(&i18n), page.hint(&i18n)))
                .collect();
            Ok(lines.join("\n"))
        }
        Command::Help => Ok(i18n.tr("cli-usage")),
    }
}
