use std::io::{self, BufRead};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mailverify_lib::VerifierConfig;

#[derive(Parser)]
#[command(name = "mailverify-cli", version, about = "Vérifie des adresses e-mail")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,

    /// lit des adresses depuis stdin (une par ligne)
    #[arg(long, global = true)]
    pub stdin: bool,

    /// format: human|json
    #[arg(long, global = true, default_value = "human")]
    pub format: String,

    /// write report to file instead of stdout (json)
    #[arg(long, global = true)]
    pub out: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// syntaxe uniquement, aucun accès réseau
    Parse { email: Option<String> },
    /// vérification complète (DNS, SMTP, classifieurs)
    Verify {
        email: Option<String>,
        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(clap::Args)]
pub struct EngineArgs {
    /// sonde la boîte via SMTP (port 25 sortant requis)
    #[arg(long, env = "MAILVERIFY_SMTP")]
    pub smtp: bool,

    /// propose une correction du domaine (gmial.com -> gmail.com)
    #[arg(long, env = "MAILVERIFY_SUGGEST")]
    pub suggest: bool,

    /// télécharge la liste des domaines jetables au démarrage
    #[arg(long, env = "MAILVERIFY_AUTO_UPDATE_DISPOSABLE")]
    pub auto_update_disposable: bool,

    /// URL de la liste des domaines jetables
    #[arg(long, env = "MAILVERIFY_DISPOSABLE_URL")]
    pub disposable_url: Option<String>,

    /// ajoute un domaine jetable (répétable)
    #[arg(long = "disposable")]
    pub extra_disposable: Vec<String>,

    /// interroge quand même DNS/SMTP pour les domaines jetables
    #[arg(long)]
    pub check_disposable_mx: bool,

    /// socks5://[user:pass@]host:port
    #[arg(long, env = "MAILVERIFY_PROXY")]
    pub proxy: Option<String>,

    /// timeout SMTP par opération (s)
    #[arg(long, env = "MAILVERIFY_SMTP_TIMEOUT", default_value_t = 10)]
    pub smtp_timeout: u64,

    #[arg(long, default_value_t = 25)]
    pub smtp_port: u16,

    /// désactive la détection catch-all
    #[arg(long)]
    pub no_catch_all: bool,

    /// nom utilisé pour EHLO/HELO
    #[arg(long, env = "MAILVERIFY_HELO")]
    pub helo: Option<String>,

    /// enveloppe MAIL FROM ("" pour <>)
    #[arg(long = "from", env = "MAILVERIFY_FROM")]
    pub mail_from: Option<String>,

    /// budget global par adresse (s)
    #[arg(long, env = "MAILVERIFY_TIMEOUT", default_value_t = 60)]
    pub timeout: u64,

    /// timeout DNS (s)
    #[arg(long, default_value_t = 5)]
    pub dns_timeout: u64,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn email_arg(&self) -> Option<&str> {
        match &self.cmd {
            Commands::Parse { email } | Commands::Verify { email, .. } => email.as_deref(),
        }
    }

    /// Adresses à traiter: l'argument, ou stdin (lignes vides ignorées).
    pub fn inputs(&self) -> Result<Vec<String>> {
        if self.stdin {
            let mut emails = Vec::new();
            for line in io::stdin().lock().lines() {
                let line = line.context("read stdin")?;
                if !line.trim().is_empty() {
                    emails.push(line);
                }
            }
            return Ok(emails);
        }
        match self.email_arg() {
            Some(email) => Ok(vec![email.to_string()]),
            None => bail!("an email address or --stdin is required"),
        }
    }
}

impl EngineArgs {
    pub fn config(&self) -> VerifierConfig {
        let mut config = VerifierConfig::default()
            .enable_smtp_check(self.smtp)
            .enable_domain_suggest(self.suggest)
            .enable_auto_update_disposable(self.auto_update_disposable)
            .check_disposable_mail_servers(self.check_disposable_mx)
            .catch_all_check(!self.no_catch_all)
            .smtp_timeout(Duration::from_secs(self.smtp_timeout))
            .smtp_port(self.smtp_port)
            .request_timeout(Duration::from_secs(self.timeout))
            .dns_timeout(Duration::from_secs(self.dns_timeout));
        if let Some(proxy) = &self.proxy {
            config = config.proxy(proxy.clone());
        }
        if let Some(helo) = &self.helo {
            config = config.helo_name(helo.clone());
        }
        if let Some(from) = &self.mail_from {
            config = config.from_email(from.clone());
        }
        if let Some(url) = &self.disposable_url {
            config = config.disposable_source_url(url.clone());
        }
        config
    }
}
