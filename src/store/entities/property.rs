use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub property_type: Option<String>,
    pub price: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub address: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub status: String,
    #[sea_orm(column_type = "Text")]
    pub images: String, // JSON array of URLs
    #[sea_orm(column_type = "Text", nullable, unique)]
    pub property_code: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub property_code_type: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub owner_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub owner_phone: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub broker_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub broker_phone: Option<String>,
    pub price_per_sqft: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub location_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub source_type: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
