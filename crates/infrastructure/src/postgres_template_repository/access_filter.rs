use sqlx::{Postgres, QueryBuilder};
use templar_application::TemplateAccessFilter;

/// Compiles a template access filter into a boolean SQL condition over `templates`.
pub(super) fn push_access_condition(
    builder: &mut QueryBuilder<'_, Postgres>,
    filter: &TemplateAccessFilter,
) {
    match filter {
        TemplateAccessFilter::All => {
            builder.push("TRUE");
        }
        TemplateAccessFilter::Nothing => {
            builder.push("FALSE");
        }
        TemplateAccessFilter::InOrganizations(organizations) => {
            builder.push("templates.organization_id = ANY(");
            builder.push_bind(
                organizations
                    .iter()
                    .map(|organization_id| organization_id.as_uuid())
                    .collect::<Vec<_>>(),
            );
            builder.push(')');
        }
        TemplateAccessFilter::GrantedTo { users, groups } => {
            builder.push(
                "EXISTS (SELECT 1 FROM template_acl_entries AS grants \
                 WHERE grants.template_id = templates.id AND \
                 ((grants.principal_kind = 'user' AND grants.principal_id = ANY(",
            );
            builder.push_bind(users.iter().map(|id| id.as_uuid()).collect::<Vec<_>>());
            builder.push(")) OR (grants.principal_kind = 'group' AND grants.principal_id = ANY(");
            builder.push_bind(groups.iter().map(|id| id.as_uuid()).collect::<Vec<_>>());
            builder.push("))))");
        }
        TemplateAccessFilter::And(nodes) => push_group(builder, nodes, " AND ", "TRUE"),
        TemplateAccessFilter::Or(nodes) => push_group(builder, nodes, " OR ", "FALSE"),
    }
}

fn push_group(
    builder: &mut QueryBuilder<'_, Postgres>,
    nodes: &[TemplateAccessFilter],
    separator: &str,
    empty: &str,
) {
    if nodes.is_empty() {
        builder.push(empty);
        return;
    }

    builder.push('(');
    for (index, node) in nodes.iter().enumerate() {
        if index > 0 {
            builder.push(separator);
        }
        push_access_condition(builder, node);
    }
    builder.push(')');
}
