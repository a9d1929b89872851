//! Flex bubble listing the nearby sites.

use chumsai_core::SiteAggregate;
use serde_json::{json, Value};

use crate::types::OutgoingMessage;

const BRAND_GREEN: &str = "#1DB954";
const MEDALS: [&str; 5] = ["🥇", "🥈", "🥉", "4️⃣", "5️⃣"];
const FALLBACK_MARKER: &str = "📍";

/// Shortest exact rendering of a radius: `5.0` → `"5"`, `2.5` → `"2.5"`.
#[must_use]
pub fn format_radius(radius_km: f64) -> String {
    radius_km.to_string()
}

/// Builds the reply for a finished search.
///
/// An empty `sites` slice yields the "not found" bubble with a link to the
/// full map.
#[must_use]
pub fn build_nearby_message(
    sites: &[SiteAggregate],
    radius_km: f64,
    map_url: &str,
) -> OutgoingMessage {
    let radius = format_radius(radius_km);
    if sites.is_empty() {
        return OutgoingMessage::Flex {
            alt_text: "ไม่พบชุมสายใกล้เคียง".to_string(),
            contents: not_found_bubble(&radius, map_url),
        };
    }

    let cards: Vec<Value> = sites
        .iter()
        .enumerate()
        .map(|(rank, site)| site_card(rank, site, map_url))
        .collect();

    OutgoingMessage::Flex {
        alt_text: format!("พบ {} ชุมสายใกล้เคียง", sites.len()),
        contents: json!({
            "type": "bubble",
            "size": "mega",
            "header": {
                "type": "box",
                "layout": "vertical",
                "contents": [
                    {
                        "type": "text",
                        "text": "📍 ชุมสายใกล้เคียงคุณ",
                        "weight": "bold",
                        "size": "xl",
                        "color": "#ffffff"
                    },
                    {
                        "type": "text",
                        "text": format!("ภายในรัศมี {radius} กม."),
                        "size": "xs",
                        "color": "#ffffff",
                        "margin": "xs"
                    }
                ],
                "backgroundColor": BRAND_GREEN,
                "paddingAll": "20px"
            },
            "body": {
                "type": "box",
                "layout": "vertical",
                "contents": cards,
                "paddingAll": "15px"
            }
        }),
    }
}

fn not_found_bubble(radius: &str, map_url: &str) -> Value {
    json!({
        "type": "bubble",
        "body": {
            "type": "box",
            "layout": "vertical",
            "contents": [
                {
                    "type": "text",
                    "text": "❌ ไม่พบชุมสายใกล้เคียง",
                    "weight": "bold",
                    "size": "xl",
                    "color": "#FF6B6B"
                },
                {
                    "type": "text",
                    "text": format!("ไม่พบชุมสายในรัศมี {radius} กม."),
                    "size": "sm",
                    "color": "#999999",
                    "margin": "md",
                    "wrap": true
                },
                { "type": "separator", "margin": "lg" },
                {
                    "type": "text",
                    "text": "คุณสามารถเปิดแผนที่ทั้งหมดเพื่อดูตำแหน่งชุมสายทั้งหมดได้",
                    "size": "xs",
                    "color": "#666666",
                    "margin": "md",
                    "wrap": true
                }
            ]
        },
        "footer": {
            "type": "box",
            "layout": "vertical",
            "contents": [map_button("🗺️ เปิดแผนที่ทั้งหมด", map_url)]
        }
    })
}

fn site_card(rank: usize, site: &SiteAggregate, map_url: &str) -> Value {
    let medal = MEDALS.get(rank).copied().unwrap_or(FALLBACK_MARKER);
    let margin = if rank == 0 { "none" } else { "lg" };
    let mut button = map_button("🗺️ เปิดแผนที่", map_url);
    button["height"] = json!("sm");
    button["margin"] = json!("md");

    json!({
        "type": "box",
        "layout": "vertical",
        "contents": [
            {
                "type": "text",
                "text": format!("{medal} {}", site.name),
                "weight": "bold",
                "size": "lg",
                "color": BRAND_GREEN,
                "wrap": true
            },
            detail_line("sm", "📏", &format!("ระยะทาง: {:.2} กม.", site.min_distance_km)),
            detail_line("xs", "📌", &format!("จำนวน: {} จุด", site.point_count)),
            button
        ],
        "margin": margin,
        "paddingAll": "10px",
        "backgroundColor": "#F8F8F8",
        "cornerRadius": "10px"
    })
}

fn detail_line(margin: &str, icon: &str, text: &str) -> Value {
    json!({
        "type": "box",
        "layout": "baseline",
        "margin": margin,
        "contents": [
            { "type": "text", "text": icon, "size": "sm", "flex": 0 },
            {
                "type": "text",
                "text": text,
                "size": "sm",
                "color": "#666666",
                "margin": "sm",
                "flex": 1
            }
        ]
    })
}

fn map_button(label: &str, map_url: &str) -> Value {
    json!({
        "type": "button",
        "style": "primary",
        "action": { "type": "uri", "label": label, "uri": map_url },
        "color": BRAND_GREEN
    })
}
