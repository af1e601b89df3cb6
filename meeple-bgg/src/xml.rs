use meeple_core::{GameDetails, GameStatus};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::BggError;
use crate::types::{CollectionItem, SearchResult};

/// Hard cap on search hits handed back to callers.
pub const MAX_SEARCH_RESULTS: usize = 10;

// ---------------------------------------------------------------------------
// Search responses
// ---------------------------------------------------------------------------

/// Parse a `/search` response into a bounded result list.
///
/// An empty document is a valid no-match result, not an error. Items whose
/// id is missing or unreadable are skipped.
pub fn parse_search(xml: &str) -> Result<Vec<SearchResult>, BggError> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut results: Vec<SearchResult> = Vec::new();
    let mut current: Option<SearchResult> = None;
    let mut have_primary = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => match e.name().as_ref() {
                b"item" => {
                    current = attr_i64(e, b"id")?.map(|id| SearchResult {
                        bgg_id: id,
                        name: String::new(),
                        year_published: None,
                    });
                    have_primary = false;
                }
                b"name" => {
                    if let Some(ref mut item) = current {
                        let primary = attr_text(e, b"type")?.as_deref() == Some("primary");
                        if let Some(value) = attr_text(e, b"value")? {
                            // A result may list alternate names; the primary
                            // one wins when both appear.
                            if primary && !have_primary {
                                item.name = value;
                                have_primary = true;
                            } else if item.name.is_empty() {
                                item.name = value;
                            }
                        }
                    }
                }
                b"yearpublished" => {
                    if let Some(ref mut item) = current {
                        item.year_published = attr_i32(e, b"value")?.filter(|y| *y != 0);
                    }
                }
                _ => {}
            },
            Event::End(ref e) => {
                if e.name().as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        if !item.name.is_empty() {
                            results.push(item);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    results.truncate(MAX_SEARCH_RESULTS);
    Ok(results)
}

// ---------------------------------------------------------------------------
// Thing (game details) responses
// ---------------------------------------------------------------------------

/// Parse a `/thing` response into the details of its first item.
///
/// BGG omits elements it has no data for and writes zero for unknown
/// numerics; both come back as unset fields. An empty document means the id
/// does not exist.
pub fn parse_thing(xml: &str) -> Result<GameDetails, BggError> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut details: Option<GameDetails> = None;
    let mut in_statistics = false;
    let mut collecting = false;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"item" => {
                    // Batch queries return several items; we only ever ask
                    // for one id, so the first item is the answer.
                    if details.is_none() {
                        details = Some(start_thing_item(e)?);
                    }
                }
                b"statistics" => in_statistics = true,
                b"description" | b"image" | b"thumbnail" => {
                    if details.is_some() {
                        collecting = true;
                        text.clear();
                    }
                }
                _ => {
                    if let Some(ref mut d) = details {
                        apply_thing_element(e, d, in_statistics)?;
                    }
                }
            },
            Event::Empty(ref e) => {
                if let Some(ref mut d) = details {
                    apply_thing_element(e, d, in_statistics)?;
                }
            }
            Event::Text(ref e) => {
                if collecting {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"statistics" => in_statistics = false,
                b"description" => {
                    if let Some(ref mut d) = details {
                        d.description = non_empty(&decode_html_entities(text.trim()));
                    }
                    collecting = false;
                }
                b"image" => {
                    if let Some(ref mut d) = details {
                        d.image_url = non_empty(text.trim());
                    }
                    collecting = false;
                }
                b"thumbnail" => {
                    if let Some(ref mut d) = details {
                        d.thumbnail_url = non_empty(text.trim());
                    }
                    collecting = false;
                }
                b"item" => break,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let details = details.ok_or(BggError::NotFound)?;
    if details.name.is_empty() {
        return Err(BggError::parse("thing item has no primary name"));
    }
    Ok(details)
}

fn start_thing_item(e: &BytesStart<'_>) -> Result<GameDetails, BggError> {
    let mut id = None;
    let mut kind = String::new();
    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"id" => id = attr.unescape_value()?.parse::<i64>().ok(),
            b"type" => kind = attr.unescape_value()?.to_string(),
            _ => {}
        }
    }
    let id = id.ok_or_else(|| BggError::parse("thing item is missing a numeric id"))?;
    let mut details = GameDetails::bare(id, String::new());
    details.is_expansion = kind == "boardgameexpansion";
    Ok(details)
}

fn apply_thing_element(
    e: &BytesStart<'_>,
    details: &mut GameDetails,
    in_statistics: bool,
) -> Result<(), BggError> {
    match e.name().as_ref() {
        b"name" => {
            let kind = attr_text(e, b"type")?;
            if kind.as_deref() == Some("primary") || (kind.is_none() && details.name.is_empty()) {
                if let Some(value) = attr_text(e, b"value")? {
                    details.name = value;
                }
            }
        }
        // Year zero means "unknown" on BGG; negative years are real (BC).
        b"yearpublished" => details.year_published = attr_i32(e, b"value")?.filter(|y| *y != 0),
        b"minplayers" => details.min_players = attr_i32(e, b"value")?.filter(|v| *v > 0),
        b"maxplayers" => details.max_players = attr_i32(e, b"value")?.filter(|v| *v > 0),
        b"playingtime" => details.playing_time = attr_i32(e, b"value")?.filter(|v| *v > 0),
        b"minage" => details.min_age = attr_i32(e, b"value")?.filter(|v| *v > 0),
        b"link" => apply_thing_link(e, details)?,
        b"average" if in_statistics => {
            // An average of exactly zero means nobody has rated it yet.
            details.rating = attr_f64(e, b"value")?.filter(|v| *v > 0.0);
        }
        b"averageweight" if in_statistics => {
            details.complexity = attr_f64(e, b"value")?.filter(|v| *v > 0.0);
        }
        _ => {}
    }
    Ok(())
}

fn apply_thing_link(e: &BytesStart<'_>, details: &mut GameDetails) -> Result<(), BggError> {
    let mut kind = None;
    let mut value = None;
    let mut id = None;
    let mut inbound = false;
    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"type" => kind = Some(attr.unescape_value()?.to_string()),
            b"value" => value = Some(attr.unescape_value()?.to_string()),
            b"id" => id = attr.unescape_value()?.parse::<i64>().ok(),
            b"inbound" => inbound = attr.value.as_ref() == b"true",
            _ => {}
        }
    }
    let Some(kind) = kind else { return Ok(()) };
    match kind.as_str() {
        "boardgamecategory" => push_unique(&mut details.categories, value),
        "boardgamemechanic" => push_unique(&mut details.mechanics, value),
        "boardgamedesigner" => push_unique(&mut details.designers, value),
        "boardgamepublisher" => push_unique(&mut details.publishers, value),
        "boardgameexpansion" => {
            // On an expansion item the inbound link names the base game.
            // The outbound form on a base game lists its expansions, which
            // is not ownership information and is ignored here.
            if details.is_expansion && inbound && details.base_game_bgg_id.is_none() {
                details.base_game_bgg_id = id;
            }
        }
        _ => {}
    }
    Ok(())
}

fn push_unique(list: &mut Vec<String>, value: Option<String>) {
    if let Some(v) = value {
        if !v.is_empty() && !list.contains(&v) {
            list.push(v);
        }
    }
}

// ---------------------------------------------------------------------------
// Collection responses
// ---------------------------------------------------------------------------

/// Parse a `/collection` response into listing entries.
///
/// BGG answers bad usernames with an `<errors>` document and HTTP 200; that
/// surfaces as [`BggError::Api`]. An empty collection is a valid result.
pub fn parse_collection(xml: &str) -> Result<Vec<CollectionItem>, BggError> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut items: Vec<CollectionItem> = Vec::new();
    let mut current: Option<CollectionItem> = None;
    let mut collecting = false;
    let mut text = String::new();
    let mut in_error = false;
    let mut error_message = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"item" => {
                    current = attr_i64(e, b"objectid")?.map(|id| CollectionItem {
                        bgg_id: id,
                        name: String::new(),
                        year_published: None,
                        status: GameStatus::default(),
                    });
                }
                b"name" | b"yearpublished" => {
                    if current.is_some() {
                        collecting = true;
                        text.clear();
                    }
                }
                b"error" => in_error = true,
                b"message" => {
                    if in_error {
                        collecting = true;
                        text.clear();
                    }
                }
                _ => {}
            },
            Event::Empty(ref e) => {
                if e.name().as_ref() == b"status" {
                    if let Some(ref mut item) = current {
                        item.status = status_from_attributes(e)?;
                    }
                }
            }
            Event::Text(ref e) => {
                if collecting {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"name" => {
                    if let Some(ref mut item) = current {
                        item.name = text.trim().to_string();
                    }
                    collecting = false;
                }
                b"yearpublished" => {
                    if let Some(ref mut item) = current {
                        item.year_published = text.trim().parse().ok().filter(|y| *y != 0);
                    }
                    collecting = false;
                }
                b"message" => {
                    if in_error {
                        error_message = text.trim().to_string();
                    }
                    collecting = false;
                }
                b"error" => in_error = false,
                b"item" => {
                    if let Some(item) = current.take() {
                        if !item.name.is_empty() {
                            items.push(item);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !error_message.is_empty() {
        return Err(BggError::Api(error_message));
    }
    Ok(items)
}

/// Derive ownership status from the flag attributes on a collection
/// `<status .../>` element.
///
/// One item can carry several flags, so the strongest claim wins: owning
/// beats a preorder, which beats trade and wishlist markers. An item with
/// no flags at all is a play-logging entry, which BGG uses for games the
/// user played without owning.
fn status_from_attributes(e: &BytesStart<'_>) -> Result<GameStatus, BggError> {
    let mut own = false;
    let mut preordered = false;
    let mut fortrade = false;
    let mut want = false;
    let mut wanttobuy = false;
    let mut wishlist = false;
    for attr in e.attributes() {
        let attr = attr?;
        let set = attr.value.as_ref() == b"1";
        match attr.key.as_ref() {
            b"own" => own = set,
            b"preordered" => preordered = set,
            b"fortrade" => fortrade = set,
            b"want" => want = set,
            b"wanttobuy" => wanttobuy = set,
            b"wishlist" => wishlist = set,
            _ => {}
        }
    }
    Ok(if own {
        GameStatus::Owned
    } else if preordered {
        GameStatus::OnOrder
    } else if fortrade {
        GameStatus::WantTradeSell
    } else if want || wanttobuy || wishlist {
        GameStatus::Wishlist
    } else {
        GameStatus::PlayedUnowned
    })
}

// ---------------------------------------------------------------------------
// Attribute and text helpers
// ---------------------------------------------------------------------------

/// Read one attribute as text, resolving XML escapes.
fn attr_text(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, BggError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

/// Read one attribute as an integer. Missing or unreadable counts as unset.
fn attr_i32(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<i32>, BggError> {
    Ok(attr_text(e, key)?.and_then(|v| v.parse().ok()))
}

fn attr_i64(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<i64>, BggError> {
    Ok(attr_text(e, key)?.and_then(|v| v.parse().ok()))
}

fn attr_f64(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<f64>, BggError> {
    Ok(attr_text(e, key)?.and_then(|v| v.parse().ok()))
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Decode the HTML entities BGG leaves in description text.
///
/// Descriptions come back double-escaped: after XML unescaping they still
/// contain numeric character references like `&#10;` and a handful of named
/// HTML entities. Unknown entities are kept verbatim.
fn decode_html_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        // Entity names are short; don't scan far for the terminator.
        match rest[1..].char_indices().take(9).find(|(_, c)| *c == ';') {
            Some((idx, _)) => match decode_entity(&rest[1..idx + 1]) {
                Some(ch) => {
                    out.push(ch);
                    rest = &rest[idx + 2..];
                }
                None => {
                    out.push('&');
                    rest = &rest[1..];
                }
            },
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = entity.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32);
    }
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "ndash" => Some('\u{2013}'),
        "mdash" => Some('\u{2014}'),
        "lsquo" => Some('\u{2018}'),
        "rsquo" => Some('\u{2019}'),
        "ldquo" => Some('\u{201c}'),
        "rdquo" => Some('\u{201d}'),
        "hellip" => Some('\u{2026}'),
        _ => None,
    }
}
