//! The taxonomy shipped with the application, used when no taxonomy file is
//! configured.

use super::{CategoryDef, Taxonomy, OTHER_CATEGORY};

fn category(name: &str, icon: &str, subcategories: &[&str]) -> CategoryDef {
    CategoryDef::new(name, icon).with_subcategories(subcategories.iter().copied())
}

pub(super) fn default_taxonomy() -> Taxonomy {
    let expense = vec![
        category(
            "Ăn uống",
            "🍜",
            &["Đi chợ", "Nhà hàng", "Cà phê", "Ăn vặt"],
        ),
        category(
            "Hóa đơn",
            "🧾",
            &["Điện", "Nước", "Internet", "Điện thoại", "Gas"],
        ),
        category(
            "Di chuyển",
            "🛵",
            &["Xăng xe", "Gửi xe", "Taxi", "Sửa xe"],
        ),
        category(
            "Mua sắm",
            "🛍️",
            &["Quần áo", "Đồ gia dụng", "Mỹ phẩm", "Đồ điện tử"],
        ),
        category("Y tế", "💊", &["Thuốc", "Khám bệnh", "Bảo hiểm y tế"]),
        category("Giáo dục", "📚", &["Học phí", "Sách vở", "Khóa học"]),
        category("Giải trí", "🎬", &["Phim ảnh", "Du lịch", "Thể thao"]),
        category("Nhà cửa", "🏠", &["Tiền thuê nhà", "Sửa chữa", "Nội thất"]),
        category("Từ thiện", "🤝", &[]),
        category(OTHER_CATEGORY, "📦", &[]),
    ];

    let income = vec![
        category("Lương", "💰", &[]),
        category("Thưởng", "🎁", &[]),
        category("Đầu tư", "📈", &["Cổ phiếu", "Lãi tiết kiệm", "Cho thuê"]),
        category("Kinh doanh", "🏪", &[]),
        category("Được tặng", "💝", &[]),
        category(OTHER_CATEGORY, "📦", &[]),
    ];

    Taxonomy { expense, income }
}
