use phf::phf_set;

// webmails grand public
static FREE_PROVIDERS: phf::Set<&'static str> = phf_set! {
    "aol.com", "free.fr", "gmail.com", "gmx.com", "gmx.de", "gmx.net",
    "googlemail.com", "hey.com", "hotmail.co.uk", "hotmail.com",
    "hotmail.fr", "icloud.com", "laposte.net", "live.com", "live.fr",
    "mail.com", "mail.ru", "me.com", "msn.com", "naver.com", "orange.fr",
    "outlook.com", "outlook.fr", "pm.me", "proton.me", "protonmail.com",
    "qq.com", "rambler.ru", "sfr.fr", "tutanota.com", "web.de",
    "yahoo.co.jp", "yahoo.co.uk", "yahoo.com", "yahoo.fr", "yandex.com",
    "yandex.ru", "ymail.com", "zoho.com", "163.com", "126.com",
};

/// Whether `domain` belongs to a public webmail provider.
pub fn is_free_provider(domain: &str) -> bool {
    let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
    FREE_PROVIDERS.contains(domain.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_webmails() {
        assert!(is_free_provider("gmail.com"));
        assert!(is_free_provider("Yahoo.FR"));
        assert!(is_free_provider("outlook.com."));
    }

    #[test]
    fn corporate_domains_are_not_free() {
        assert!(!is_free_provider("example.com"));
        assert!(!is_free_provider("mail.gmail.com"));
        assert!(!is_free_provider(""));
    }
}
