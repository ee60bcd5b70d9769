use askama::Template;

use crate::{
    entity::enums::OrderStatus,
    models::{Order, OrderItem},
    pricing::format_brl,
};

pub struct EmailLine {
    pub name: String,
    pub detail: String,
    pub quantity: i32,
    pub total: String,
}

#[derive(Template)]
#[template(path = "email/order_status.html")]
struct OrderStatusHtml<'a> {
    store_name: &'a str,
    customer_name: &'a str,
    order_ref: &'a str,
    headline: &'a str,
    message: &'a str,
    lines: &'a [EmailLine],
    subtotal: String,
    discount: String,
    shipping: String,
    total: String,
    tracking_code: Option<&'a str>,
    tracking_url: Option<&'a str>,
    order_url: &'a str,
}

/// A rendered notification ready to be sent.
#[derive(Debug, Clone)]
pub struct OrderEmail {
    pub subject: String,
    pub html: String,
}

/// Short reference shown to customers, e.g. `#3F2A91C0`.
pub fn order_reference(order: &Order) -> String {
    let id = order.id.simple().to_string();
    format!("#{}", id[..8].to_ascii_uppercase())
}

fn copy_for(status: OrderStatus) -> (&'static str, &'static str, &'static str) {
    match status {
        OrderStatus::Pending => (
            "Recebemos seu pedido",
            "Pedido recebido!",
            "Obrigada pela sua compra. Assim que o pagamento for confirmado começaremos a preparar seus bordados.",
        ),
        OrderStatus::Paid => (
            "Pagamento confirmado",
            "Pagamento confirmado!",
            "Seu pagamento foi aprovado e o pedido já está na fila de produção.",
        ),
        OrderStatus::Processing => (
            "Seu pedido está em produção",
            "Mãos à obra!",
            "Estamos bordando e preparando cada peça do seu pedido com muito carinho.",
        ),
        OrderStatus::Shipped => (
            "Seu pedido foi enviado",
            "Pedido a caminho!",
            "Seu pedido foi postado. Acompanhe a entrega pelo código de rastreio abaixo.",
        ),
        OrderStatus::Delivered => (
            "Pedido entregue",
            "Pedido entregue!",
            "Esperamos que você e o bebê amem as peças. Conte pra gente o que achou!",
        ),
        OrderStatus::Cancelled => (
            "Pedido cancelado",
            "Pedido cancelado",
            "Seu pedido foi cancelado. Se tiver alguma dúvida é só responder este email.",
        ),
        OrderStatus::Refunded => (
            "Reembolso realizado",
            "Reembolso realizado",
            "O valor do seu pedido foi estornado. O prazo para aparecer no extrato depende do seu banco.",
        ),
    }
}

/// Render the customer notification for `order` entering `status`.
pub fn render_order_email(
    store_name: &str,
    public_base_url: &str,
    order: &Order,
    items: &[OrderItem],
    status: OrderStatus,
) -> Result<OrderEmail, askama::Error> {
    let (subject_prefix, headline, message) = copy_for(status);
    let order_ref = order_reference(order);

    let lines: Vec<EmailLine> = items
        .iter()
        .map(|item| EmailLine {
            name: item.product_name.clone(),
            detail: match (&item.color, &item.customization) {
                (Some(color), Some(text)) => format!("{color} · bordado: {text}"),
                (Some(color), None) => color.clone(),
                (None, Some(text)) => format!("bordado: {text}"),
                (None, None) => String::new(),
            },
            quantity: item.quantity,
            total: format_brl(item.price * i64::from(item.quantity)),
        })
        .collect();

    let order_url = format!(
        "{public_base_url}/pedido/{}?email={}",
        order.id, order.customer_email
    );

    let html = OrderStatusHtml {
        store_name,
        customer_name: &order.customer_name,
        order_ref: &order_ref,
        headline,
        message,
        lines: &lines,
        subtotal: format_brl(order.subtotal_amount),
        discount: if order.discount_amount > 0 {
            format_brl(order.discount_amount)
        } else {
            String::new()
        },
        shipping: if order.shipping_amount == 0 {
            "Grátis".to_string()
        } else {
            format_brl(order.shipping_amount)
        },
        total: format_brl(order.total_amount),
        tracking_code: order.tracking_code.as_deref(),
        tracking_url: order.tracking_url.as_deref(),
        order_url: &order_url,
    }
    .render()?;

    Ok(OrderEmail {
        subject: format!("{subject_prefix} {order_ref} - {store_name}"),
        html,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::{
        entity::enums::{PaymentMethod, PaymentStatus},
        models::ShippingAddress,
    };

    pub(crate) fn sample_order() -> Order {
        Order {
            id: Uuid::parse_str("3f2a91c0-0000-4000-8000-000000000000").unwrap(),
            user_id: None,
            customer_name: "Ana <Souza>".into(),
            customer_email: "ana@example.com".into(),
            customer_phone: "21999990000".into(),
            shipping_address: ShippingAddress {
                street: "Rua das Flores".into(),
                number: "10".into(),
                complement: None,
                neighborhood: "Centro".into(),
                city: "Cabo Frio".into(),
                state: "RJ".into(),
                postal_code: "28900000".into(),
            },
            status: OrderStatus::Shipped,
            payment_status: PaymentStatus::Paid,
            payment_method: PaymentMethod::Pix,
            card_brand: None,
            card_last4: None,
            shipping_service: "PAC".into(),
            shipping_service_id: Some("1".into()),
            subtotal_amount: 15_000,
            discount_amount: 1_500,
            shipping_amount: 0,
            total_amount: 13_500,
            coupon_code: Some("BEMVINDO".into()),
            tracking_code: Some("BR123456789".into()),
            tracking_url: Some("https://rastreio.example/BR123456789".into()),
            shipping_label_id: None,
            notes: None,
            paid_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_items(order_id: Uuid) -> Vec<OrderItem> {
        vec![OrderItem {
            id: Uuid::new_v4(),
            order_id,
            product_id: None,
            product_name: "Manta bordada".into(),
            price: 7_500,
            quantity: 2,
            customization: Some("Helena".into()),
            color: Some("Rosa".into()),
            created_at: Utc::now(),
        }]
    }

    #[test]
    fn shipped_email_includes_tracking_and_totals() {
        let order = sample_order();
        let items = sample_items(order.id);
        let email = render_order_email(
            "Ateliê Bordados",
            "https://loja.example.com",
            &order,
            &items,
            OrderStatus::Shipped,
        )
        .expect("render");

        assert_eq!(email.subject, "Seu pedido foi enviado #3F2A91C0 - Ateliê Bordados");
        assert!(email.html.contains("BR123456789"));
        assert!(email.html.contains("R$ 150,00"));
        assert!(email.html.contains("R$ 135,00"));
        assert!(email.html.contains("Grátis"));
        assert!(email.html.contains("Rosa · bordado: Helena"));
    }

    #[test]
    fn customer_name_is_escaped() {
        let order = sample_order();
        let email = render_order_email("Loja", "http://x", &order, &[], OrderStatus::Pending)
            .expect("render");
        assert!(!email.html.contains("<Souza>"));
        assert!(email.html.contains("&lt;Souza&gt;") || email.html.contains("&#60;Souza&#62;"));
    }

    #[test]
    fn every_status_renders() {
        let order = sample_order();
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
            OrderStatus::Refunded,
        ] {
            let email = render_order_email("Loja", "http://x", &order, &[], status).expect("render");
            assert!(email.html.contains("#3F2A91C0"));
        }
    }
}
