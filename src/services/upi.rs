use base64::{engine::general_purpose::STANDARD, Engine};
use qrcode::render::svg;
use qrcode::QrCode;
use serde::Serialize;
use url::form_urlencoded;

/// A ready-to-display manual payment reference: the UPI deep link plus an
/// optional scannable rendering of it.
///
/// The QR is best-effort. When rendering fails the raw URI is still
/// returned, so the tenant can always see where to pay.
#[derive(Debug, Clone, Serialize)]
pub struct UpiIntent {
    pub uri: String,
    /// `data:image/svg+xml;base64,...` suitable for an `<img>` src.
    pub qr_data_uri: Option<String>,
}

/// Build a `upi://pay` deep link. Amounts are carried internally in minor
/// units; the URI is the one boundary where they are rendered as rupees
/// with two decimal places.
pub fn build_pay_uri(
    payee_vpa: &str,
    payee_name: &str,
    amount_minor: i64,
    currency: &str,
    note: &str,
) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("pa", payee_vpa.trim())
        .append_pair("pn", payee_name.trim())
        .append_pair("am", &format_major(amount_minor))
        .append_pair("cu", currency)
        .append_pair("tn", note)
        .finish();
    format!("upi://pay?{query}")
}

pub fn build_intent(
    payee_vpa: &str,
    payee_name: &str,
    amount_minor: i64,
    currency: &str,
    note: &str,
) -> UpiIntent {
    let uri = build_pay_uri(payee_vpa, payee_name, amount_minor, currency, note);
    let qr_data_uri = match QrCode::new(uri.as_bytes()) {
        Ok(code) => {
            let image = code
                .render::<svg::Color>()
                .min_dimensions(240, 240)
                .build();
            Some(format!("data:image/svg+xml;base64,{}", STANDARD.encode(image)))
        }
        Err(error) => {
            tracing::warn!(error = %error, "QR rendering failed, falling back to raw URI");
            None
        }
    };
    UpiIntent { uri, qr_data_uri }
}

fn format_major(amount_minor: i64) -> String {
    format!("{}.{:02}", amount_minor / 100, amount_minor % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_carries_all_fields() {
        let uri = build_pay_uri(
            "host@upi",
            "Kiraya Stays",
            10_500_000,
            "INR",
            "Booking 7 nights",
        );
        assert!(uri.starts_with("upi://pay?"));
        assert!(uri.contains("pa=host%40upi"));
        assert!(uri.contains("am=105000.00"));
        assert!(uri.contains("cu=INR"));
        // Note is URL-encoded.
        assert!(uri.contains("tn=Booking+7+nights"));
    }

    #[test]
    fn amount_formats_minor_units_as_rupees() {
        assert_eq!(format_major(99_900), "999.00");
        assert_eq!(format_major(105), "1.05");
        assert_eq!(format_major(4_500_000), "45000.00");
    }

    #[test]
    fn intent_includes_scannable_rendering() {
        let intent = build_intent("host@upi", "Kiraya Stays", 4_500_000, "INR", "stay");
        let qr = intent.qr_data_uri.expect("QR should render for a short URI");
        assert!(qr.starts_with("data:image/svg+xml;base64,"));
        assert!(intent.uri.contains("am=45000.00"));
    }
}
