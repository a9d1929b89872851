use crate::flex::format_radius;

const GREETINGS: [&str; 4] = ["สวัสดี", "hello", "hi", "หวัดดี"];

/// Canned answer to a free-text message.
///
/// Greetings must match a keyword exactly, ignoring case only; help is
/// triggered by `ช่วย` or `help` anywhere in the text.
#[must_use]
pub fn text_reply(text: &str, radius_km: f64) -> String {
    let lowered = text.to_lowercase();
    let radius = format_radius(radius_km);

    if GREETINGS.contains(&lowered.as_str()) {
        format!(
            "สวัสดีครับ! 👋\n\n📍 กรุณาส่งพิกัด (Location) มาให้บอท\n\n\
             บอทจะค้นหาชุมสายใกล้เคียงภายในรัศมี {radius} กม. ให้คุณครับ"
        )
    } else if lowered.contains("ช่วย") || lowered.contains("help") {
        format!(
            "📖 วิธีใช้งาน:\n\n1. กดปุ่ม '+' ใน LINE\n2. เลือก 'ตำแหน่งที่อยู่'\n\
             3. เลือกตำแหน่งปัจจุบัน หรือค้นหาสถานที่\n4. ส่งตำแหน่งมาให้บอท\n\n\
             บอทจะแสดงชุมสายใกล้เคียง (รัศมี {radius} กม.) ให้คุณเลือกดูได้เลยครับ!"
        )
    } else {
        "❓ กรุณาส่งพิกัด (Location) เพื่อค้นหาชุมสายใกล้เคียง\n\nหรือพิมพ์ 'ช่วย' เพื่อดูวิธีใช้งาน"
            .to_string()
    }
}
