//! Document mode from the DOCTYPE.
//!
//! [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)

use koala_dom::DocumentMode;

use crate::tokenizer::DoctypeToken;

/// "The public identifier starts with" one of these (compared ASCII
/// case-insensitively) puts the document in quirks mode.
const QUIRKS_PUBLIC_ID_PREFIXES: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

/// Public identifiers that force quirks mode on an exact match.
const QUIRKS_PUBLIC_IDS: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

/// "The system identifier is set to
/// "http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd""
const QUIRKS_SYSTEM_ID: &str = "http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd";

/// Prefixes that mean quirks mode when the system identifier is missing and
/// limited-quirks mode when it is present.
const HTML4_PUBLIC_ID_PREFIXES: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

/// Prefixes that always mean limited-quirks mode.
const LIMITED_QUIRKS_PUBLIC_ID_PREFIXES: &[&str] = &[
    "-//w3c//dtd xhtml 1.0 frameset//",
    "-//w3c//dtd xhtml 1.0 transitional//",
];

fn starts_with_any(id: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| {
        id.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// "If the DOCTYPE token's name is not "html", or the token's public
/// identifier is not missing, or the token's system identifier is neither
/// missing nor "about:legacy-compat", then there is a parse error."
#[must_use]
pub fn is_conforming(doctype: &DoctypeToken) -> bool {
    doctype.name.as_deref() == Some("html")
        && doctype.public_id.is_none()
        && doctype
            .system_id
            .as_deref()
            .is_none_or(|id| id == "about:legacy-compat")
}

/// The document mode a DOCTYPE selects. `iframe_srcdoc` documents are never
/// produced by this parser, so that exemption does not apply.
#[must_use]
pub fn document_mode_for(doctype: &DoctypeToken) -> DocumentMode {
    if doctype.force_quirks || doctype.name.as_deref() != Some("html") {
        return DocumentMode::Quirks;
    }

    let public_id = doctype.public_id.as_deref();
    let system_id = doctype.system_id.as_deref();

    if let Some(public_id) = public_id {
        if QUIRKS_PUBLIC_IDS
            .iter()
            .any(|id| id.eq_ignore_ascii_case(public_id))
            || starts_with_any(public_id, QUIRKS_PUBLIC_ID_PREFIXES)
            || (system_id.is_none() && starts_with_any(public_id, HTML4_PUBLIC_ID_PREFIXES))
        {
            return DocumentMode::Quirks;
        }
    }
    if system_id.is_some_and(|id| id.eq_ignore_ascii_case(QUIRKS_SYSTEM_ID)) {
        return DocumentMode::Quirks;
    }

    if let Some(public_id) = public_id
        && (starts_with_any(public_id, LIMITED_QUIRKS_PUBLIC_ID_PREFIXES)
            || (system_id.is_some() && starts_with_any(public_id, HTML4_PUBLIC_ID_PREFIXES)))
    {
        return DocumentMode::LimitedQuirks;
    }

    DocumentMode::NoQuirks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctype(name: &str, public_id: Option<&str>, system_id: Option<&str>) -> DoctypeToken {
        DoctypeToken {
            name: Some(name.to_string()),
            public_id: public_id.map(str::to_string),
            system_id: system_id.map(str::to_string),
            ..DoctypeToken::default()
        }
    }

    #[test]
    fn test_html5_doctype_is_no_quirks() {
        let token = doctype("html", None, None);
        assert!(is_conforming(&token));
        assert_eq!(document_mode_for(&token), DocumentMode::NoQuirks);
    }

    #[test]
    fn test_legacy_compat_is_conforming() {
        assert!(is_conforming(&doctype("html", None, Some("about:legacy-compat"))));
        assert!(!is_conforming(&doctype("html", Some(""), None)));
    }

    #[test]
    fn test_quirks_triggers() {
        let mut token = doctype("html", None, None);
        token.force_quirks = true;
        assert_eq!(document_mode_for(&token), DocumentMode::Quirks);
        assert_eq!(
            document_mode_for(&doctype("svg", None, None)),
            DocumentMode::Quirks
        );
        assert_eq!(
            document_mode_for(&doctype("html", Some("-//W3C//DTD HTML 3.2 Final//EN"), None)),
            DocumentMode::Quirks
        );
        assert_eq!(
            document_mode_for(&doctype(
                "html",
                Some("-//W3C//DTD HTML 4.01 Transitional//EN"),
                None
            )),
            DocumentMode::Quirks
        );
    }

    #[test]
    fn test_limited_quirks() {
        assert_eq!(
            document_mode_for(&doctype(
                "html",
                Some("-//W3C//DTD HTML 4.01 Transitional//EN"),
                Some("http://www.w3.org/TR/html4/loose.dtd")
            )),
            DocumentMode::LimitedQuirks
        );
        assert_eq!(
            document_mode_for(&doctype(
                "html",
                Some("-//W3C//DTD XHTML 1.0 Strict//EN"),
                None
            )),
            DocumentMode::NoQuirks
        );
    }
}
