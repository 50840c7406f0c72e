//! 提示词模板。
//!
//! 类别列表是封闭集合，模型必须从中选择；回复格式固定为 JSON。

/// 允许的服务类别（顺序即提示词中的顺序）。
pub const SERVICE_CATEGORIES: [&str; 20] = [
    "Towing",
    "Car Repairs & Maintenance",
    "Rental Listings",
    "Handyman",
    "Plumbing",
    "Electrical",
    "Carpentry",
    "Concerts",
    "Cleaning Services",
    "Community Events",
    "Food",
    "Food Delivery",
    "Restaurant",
    "Local Markets",
    "Yoga Studios",
    "Gyms",
    "Landlords",
    "Therapists",
    "Car Wash",
    "Tutors",
];

/// 类别是否在封闭集合中（大小写敏感）。
pub fn is_known_category(category: &str) -> bool {
    SERVICE_CATEGORIES.contains(&category)
}

/// 首个内容块：用户提交的摘要与详情。
pub fn intro_text(summary: &str, details: &str) -> String {
    format!(
        "Service Experience Summary: {summary}\n\nDetailed Description: {details}\n\nPlease analyze the following images of this service:"
    )
}

/// 每张图片前的标签，`index` 从 1 开始。
pub fn image_label(index: usize) -> String {
    format!("\n\nImage {index}:")
}

/// 末尾的指令块。
pub fn instructions_text() -> String {
    format!(
        r#"

Based on the summary, details, and images provided, please:
1. Identify the service category. MUST be one of these exact categories:
   {categories}
2. Provide a rating from 1.0 to 5.0 (where 5.0 is excellent). Do not give the fraction rating value.
3. Indicate your confidence level (High, Medium, Low)
4. Create an enhanced, professional version of the user's summary (more detailed and well-written)
5. Create an enhanced, comprehensive version of the user's description (more articulate and complete)

Respond ONLY with a JSON object in this exact format:
{{
	"category": "category name",
	"rating": 3,
	"confidence": "High/Medium/Low",
	"enhanced_summary": "enhanced professional summary",
	"enhanced_description": "enhanced comprehensive description"
}}"#,
        categories = SERVICE_CATEGORIES.join(", ")
    )
}
