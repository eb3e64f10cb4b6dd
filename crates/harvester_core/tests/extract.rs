use harvester_core::extract_emails;
use pretty_assertions::assert_eq;

#[test]
fn finds_addresses_in_markup() {
    let html = r#"<p>Contact <a href="mailto:sales@example.com">sales@example.com</a>
        or support+web@help.example.co.uk.</p>"#;

    assert_eq!(
        extract_emails(html),
        vec!["sales@example.com", "support+web@help.example.co.uk"]
    );
}

#[test]
fn empty_when_nothing_matches() {
    assert!(extract_emails("").is_empty());
    assert!(extract_emails("no addresses here, just an @ sign and user@localhost").is_empty());
}

#[test]
fn doubling_the_input_changes_nothing() {
    let page = "a.b@c.org, x_y%z@host-1.net and again a.b@c.org";
    let once = extract_emails(page);
    let twice = extract_emails(&format!("{page}{page}"));

    assert_eq!(once, twice);
    assert_eq!(once, vec!["a.b@c.org", "x_y%z@host-1.net"]);
}

#[test]
fn case_variants_are_kept_apart() {
    let found = extract_emails("a@b.com A@B.COM a@b.com");
    assert_eq!(found, vec!["a@b.com", "A@B.COM"]);
}

#[test]
fn top_level_domain_needs_two_letters() {
    assert!(extract_emails("me@host.c").is_empty());
    assert_eq!(extract_emails("me@host.io"), vec!["me@host.io"]);
}
