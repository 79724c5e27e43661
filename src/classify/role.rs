use phf::phf_set;

/// Local parts that name a function or a team rather than a person.
static ROLE_LOCAL_PARTS: phf::Set<&'static str> = phf_set! {
    "abuse", "accounting", "accounts", "admin", "administrator", "all",
    "billing", "careers", "contact", "customercare", "customerservice",
    "dev", "devnull", "dns", "enquiries", "feedback", "finance", "ftp",
    "hello", "help", "helpdesk", "hostmaster", "hr", "info", "inquiries",
    "it", "jobs", "legal", "list", "mail", "mailer-daemon", "marketing",
    "media", "news", "newsletter", "no-reply", "noc", "noreply",
    "do-not-reply", "donotreply", "office", "orders", "postmaster",
    "press", "privacy", "recruitment", "root", "sales", "security",
    "service", "spam", "staff", "subscribe", "support", "sysadmin",
    "team", "tech", "unsubscribe", "webmaster", "www",
};

/// Whether `local_part` is a role account (`admin`, `support+tickets`, ...).
/// Matching ignores case and any `+tag` suffix.
pub fn is_role_account(local_part: &str) -> bool {
    let base = local_part.split('+').next().unwrap_or_default();
    if base.is_empty() {
        return false;
    }
    ROLE_LOCAL_PARTS.contains(base.to_ascii_lowercase().as_str())
}
