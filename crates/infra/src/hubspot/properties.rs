//! CRM property lists
//!
//! Single source of truth for the properties requested from HubSpot. All
//! fetch and search paths must use these lists; never define property names
//! elsewhere.

use opsdeck_domain::ObjectType;

/// Core contact properties, used by all contact fetch/search operations
pub const CONTACT_PROPERTIES: &[&str] = &[
    // Identity
    "firstname",
    "lastname",
    "email",
    "phone",
    "mobilephone",
    "jobtitle",
    "hs_object_id",
    "hubspot_owner_id",
    "lifecyclestage",
    "hs_lead_status",
    "createdate",
    "lastmodifieddate",
    "city",
    "country",
    // Attribution
    "hs_analytics_source",
    "hs_analytics_source_data_1",
    "utm_source",
    "utm_medium",
    "utm_campaign",
    // Lead management
    "num_contacted_notes",
    "first_conversion_date",
    "num_form_submissions",
    "hs_last_sales_activity_date",
    // Deals & revenue
    "num_associated_deals",
    "total_revenue",
    // Coaching-specific custom properties
    "assigned_coach",
    "assessment_scheduled",
    "assessment_date",
    "package_type",
    "sessions_purchased",
    "outstanding_sessions",
    "preferred_location",
    "fitness_goals",
    "call_status",
];

/// Deal properties
pub const DEAL_PROPERTIES: &[&str] = &[
    "dealname",
    "dealstage",
    "amount",
    "pipeline",
    "closedate",
    "hubspot_owner_id",
    "createdate",
    "lastmodifieddate",
    "hs_object_id",
];

/// Company properties
pub const COMPANY_PROPERTIES: &[&str] =
    &["name", "domain", "industry", "city", "country", "hubspot_owner_id", "createdate"];

/// Call/engagement properties
pub const ENGAGEMENT_PROPERTIES: &[&str] = &[
    "hs_call_title",
    "hs_call_status",
    "hs_call_duration",
    "hs_timestamp",
    "hs_call_to_number",
    "hs_call_from_number",
    "hubspot_owner_id",
    "hs_call_disposition",
    "hs_call_direction",
    "hs_call_body",
    "hs_call_recording_url",
];

/// Owner properties
pub const OWNER_PROPERTIES: &[&str] = &["id", "email", "firstName", "lastName", "userId"];

/// Canonical property list for an object type
pub fn default_properties(object_type: ObjectType) -> &'static [&'static str] {
    match object_type {
        ObjectType::Contact => CONTACT_PROPERTIES,
        ObjectType::Deal => DEAL_PROPERTIES,
        ObjectType::Company => COMPANY_PROPERTIES,
        ObjectType::Engagement => ENGAGEMENT_PROPERTIES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_object_type_has_properties() {
        assert!(!default_properties(ObjectType::Contact).is_empty());
        assert!(!default_properties(ObjectType::Deal).is_empty());
        assert!(!default_properties(ObjectType::Company).is_empty());
        assert!(!default_properties(ObjectType::Engagement).is_empty());
    }

    #[test]
    fn contact_list_carries_coaching_fields() {
        assert!(CONTACT_PROPERTIES.contains(&"assigned_coach"));
        assert!(CONTACT_PROPERTIES.contains(&"sessions_purchased"));
    }
}
