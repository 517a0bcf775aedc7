// ==========================================
// 接送预订系统 - 通知文案模板
// ==========================================
// 职责: 组装客户确认、后台提醒、预订批准、WhatsApp 文案
// 说明: 文案面向客户，保持英文；纯函数，不做任何 I/O
// ==========================================

use crate::domain::booking::Booking;
use crate::notify::EmailMessage;

/// 客户下单确认邮件（下单即发，纯文本）
pub fn compose_customer_confirmation(booking: &Booking) -> EmailMessage {
    let trip_type = if booking.is_return {
        "Return Trip"
    } else {
        "One Way"
    };

    let body = format!(
        "Dear {name},\n\n\
         Your transfer booking has been confirmed.\n\n\
         Type: {trip_type}\n\
         Pick-up Time: {pickup_time}\n\
         From: {from}\n\
         To: {to}\n\n\
         Vehicle: Standard Vehicle\n\
         Price: {price}\n\
         Payment: Pay on Arrival\n\n\
         Driver will meet you at the pickup location.\n\n\
         Thank you for choosing MarmarisTrip!\nSafe Travels!",
        name = booking.customer_name,
        trip_type = trip_type,
        pickup_time = booking.pickup_time,
        from = booking.pickup_location,
        to = booking.dropoff_location,
        price = display_price(&booking.price),
    );

    EmailMessage {
        to: booking.email.clone(),
        subject: "Booking Confirmation - MarmarisTrip".to_string(),
        body,
        html: false,
    }
}

/// 后台新预订提醒邮件（发给运营邮箱，纯文本）
pub fn compose_admin_notification(booking: &Booking, admin_email: &str) -> EmailMessage {
    let body = format!(
        "New Booking Received!\n\n\
         Customer: {name}\n\
         Phone: {phone}\n\
         Email: {email}\n\n\
         From: {from}\n\
         To: {to}\n\
         Date: {pickup_time}\n\
         Price: {price}\n\
         Note: {note}\n\n\
         Check admin panel for details.",
        name = booking.customer_name,
        phone = booking.phone.as_deref().unwrap_or("N/A"),
        email = booking.email,
        from = booking.pickup_location,
        to = booking.dropoff_location,
        pickup_time = booking.pickup_time,
        price = display_price(&booking.price),
        note = booking.note.as_deref().unwrap_or("-"),
    );

    EmailMessage {
        to: admin_email.to_string(),
        subject: format!(
            "[NEW BOOKING] {} -> {}",
            booking.pickup_location, booking.dropoff_location
        ),
        body,
        html: false,
    }
}

/// 预订批准确认邮件（状态改为 approved 时发送，HTML）
pub fn compose_reservation_approved(booking: &Booking) -> EmailMessage {
    let body = APPROVED_TEMPLATE
        .replace("%CUSTOMER_NAME%", &booking.customer_name)
        .replace("%BOOKING_ID%", &booking.id.to_string())
        .replace("%PICKUP_TIME%", &booking.pickup_time)
        .replace("%PICKUP_LOCATION%", &booking.pickup_location)
        .replace("%DROPOFF_LOCATION%", &booking.dropoff_location)
        .replace("%PASSENGERS%", &booking.passenger_count.to_string())
        .replace(
            "%FLIGHT_NUMBER%",
            booking.flight_number.as_deref().unwrap_or("N/A"),
        )
        .replace("%PRICE%", &approved_price(&booking.price));

    EmailMessage {
        to: booking.email.clone(),
        subject: format!("Booking Confirmation - Reservation #{}", booking.id),
        body,
        html: true,
    }
}

/// WhatsApp 下单确认文案
pub fn compose_whatsapp_confirmation(booking: &Booking) -> String {
    format!(
        "MarmarisTrip: Dear {}, your transfer from {} on {} is confirmed. \
         Our driver will contact you before pickup.",
        booking.customer_name, booking.pickup_location, booking.pickup_time
    )
}

fn display_price(price: &str) -> String {
    if price.trim().is_empty() || price.trim() == "0" {
        "£0.00".to_string()
    } else {
        price.to_string()
    }
}

fn approved_price(price: &str) -> String {
    if price.trim().is_empty() || price.trim() == "0" {
        "Pay on Arrival".to_string()
    } else {
        price.to_string()
    }
}

// 富文本模板：结构与站点确认页一致，占位符在组装时替换。
// CSS 花括号太多，不适合 format!，这里用显式占位符。
const APPROVED_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 0; }
        .container { max-width: 600px; margin: 0 auto; background: #f9f9f9; }
        .header { background-color: #003580; color: #ffffff; padding: 20px; text-align: center; }
        .header h1 { margin: 0; font-size: 24px; }
        .content { padding: 20px; background: #ffffff; }
        .booking-details { background-color: #f2f2f2; padding: 15px; border-radius: 4px; margin: 20px 0; }
        .detail-row { display: flex; justify-content: space-between; margin-bottom: 10px; border-bottom: 1px solid #e0e0e0; padding-bottom: 5px; }
        .detail-row:last-child { border-bottom: none; }
        .label { font-weight: bold; color: #555; }
        .value { font-weight: bold; color: #003580; }
        .footer { background-color: #f5f5f5; padding: 15px; text-align: center; font-size: 12px; color: #666; border-top: 1px solid #ddd; }
        .whatsapp-btn { display: inline-block; background-color: #25D366; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px; font-weight: bold; margin-top: 10px; }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Booking Confirmed!</h1>
            <p>Your reservation with MarmarisTrip is now approved.</p>
        </div>
        <div class="content">
            <p>Dear <strong>%CUSTOMER_NAME%</strong>,</p>
            <p>We are pleased to confirm your transfer reservation. Our driver will be ready to meet you at the scheduled time.</p>

            <div class="booking-details">
                <div class="detail-row">
                    <span class="label">Reservation ID:</span>
                    <span class="value">#%BOOKING_ID%</span>
                </div>
                <div class="detail-row">
                    <span class="label">Date &amp; Time:</span>
                    <span class="value">%PICKUP_TIME%</span>
                </div>
                <div class="detail-row">
                    <span class="label">From:</span>
                    <span class="value">%PICKUP_LOCATION%</span>
                </div>
                <div class="detail-row">
                    <span class="label">To:</span>
                    <span class="value">%DROPOFF_LOCATION%</span>
                </div>
                <div class="detail-row">
                    <span class="label">Passengers:</span>
                    <span class="value">%PASSENGERS%</span>
                </div>
                <div class="detail-row">
                    <span class="label">Flight No:</span>
                    <span class="value">%FLIGHT_NUMBER%</span>
                </div>
                <div class="detail-row">
                    <span class="label">Total Price:</span>
                    <span class="value">%PRICE%</span>
                </div>
            </div>

            <h3>Meeting Instructions</h3>
            <p>The driver will be waiting for you at the arrival terminal with a sign bearing your name. If you cannot find the driver, please contact us immediately via WhatsApp.</p>

            <div style="text-align: center; margin: 30px 0;">
                <a href="https://wa.me/905545790579" class="whatsapp-btn">
                    Chat Support (+90 554 579 05 79)
                </a>
            </div>
        </div>
        <div class="footer">
            <p>&copy; 2026 MarmarisTrip. All rights reserved.</p>
            <p>Marmaris, Turkey</p>
        </div>
    </div>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_booking() -> Booking {
        Booking {
            id: 7,
            customer_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: Some("+44 7700 900000".to_string()),
            pickup_location: "Dalaman Airport".to_string(),
            dropoff_location: "Marmaris".to_string(),
            flight_time: None,
            pickup_time: "2026-07-01T10:00:00Z".to_string(),
            is_return: false,
            status: "pending".to_string(),
            hotel_name: None,
            flight_number: Some("TK123".to_string()),
            note: None,
            passenger_count: 2,
            price: "£45.00".to_string(),
            payment_status: "Pending".to_string(),
            driver_name: None,
            driver_phone: None,
            is_archived: false,
            deleted_at: None,
            created_at: None,
        }
    }

    #[test]
    fn test_客户确认文案() {
        let msg = compose_customer_confirmation(&sample_booking());
        assert_eq!(msg.to, "jane@example.com");
        assert_eq!(msg.subject, "Booking Confirmation - MarmarisTrip");
        assert!(!msg.html);
        assert!(msg.body.contains("Dear Jane Doe"));
        assert!(msg.body.contains("Type: One Way"));
        assert!(msg.body.contains("From: Dalaman Airport"));
        assert!(msg.body.contains("Price: £45.00"));
    }

    #[test]
    fn test_往返行程文案() {
        let mut booking = sample_booking();
        booking.is_return = true;
        let msg = compose_customer_confirmation(&booking);
        assert!(msg.body.contains("Type: Return Trip"));
    }

    #[test]
    fn test_后台提醒文案() {
        let msg = compose_admin_notification(&sample_booking(), "ops@marmaristrip.com");
        assert_eq!(msg.to, "ops@marmaristrip.com");
        assert_eq!(msg.subject, "[NEW BOOKING] Dalaman Airport -> Marmaris");
        assert!(msg.body.contains("Customer: Jane Doe"));
        assert!(msg.body.contains("Phone: +44 7700 900000"));
    }

    #[test]
    fn test_批准邮件占位符替换完整() {
        let msg = compose_reservation_approved(&sample_booking());
        assert_eq!(msg.subject, "Booking Confirmation - Reservation #7");
        assert!(msg.html);
        assert!(msg.body.contains("#7"));
        assert!(msg.body.contains("Jane Doe"));
        assert!(msg.body.contains("TK123"));
        // 所有占位符都应被替换掉
        assert!(!msg.body.contains('%'));
    }

    #[test]
    fn test_零价展示() {
        let mut booking = sample_booking();
        booking.price = "0".to_string();
        let msg = compose_customer_confirmation(&booking);
        assert!(msg.body.contains("Price: £0.00"));

        let approved = compose_reservation_approved(&booking);
        assert!(approved.body.contains("Pay on Arrival"));
    }
}
