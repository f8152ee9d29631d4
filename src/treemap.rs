use crate::error::{RejectReason, Rejection};
use crate::provinces::SPHERE_PROVINCIAL;
use crate::types::{
    DepartmentRecord, GroupTree, ProvinceBucket, ProvinceGrouping, Treemap, TreemapItem,
    TreemapPayload,
};
use tracing::{debug, warn};

/// Sort every level of a tree by amount, largest first. Equal amounts keep
/// their input order.
pub fn sort_items(items: &[GroupTree]) -> Vec<GroupTree> {
    let mut sorted: Vec<GroupTree> = items
        .iter()
        .map(|item| GroupTree {
            children: item.children.as_deref().map(sort_items),
            ..item.clone()
        })
        .collect();
    sorted.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    sorted
}

fn prefix_url(url: Option<&str>) -> Option<String> {
    url.map(|u| format!("/{}", u))
}

fn transform_item(item: &TreemapItem, total: f64) -> GroupTree {
    let percentage = item.percentage_of_total.or_else(|| {
        if total > 0.0 {
            Some(item.amount / total * 100.0)
        } else {
            None
        }
    });
    GroupTree {
        name: item.name.clone(),
        id: item.slug.clone().unwrap_or_else(|| item.name.clone()),
        amount: item.amount,
        percentage,
        url: prefix_url(item.url.as_deref()),
        children: item
            .children
            .as_ref()
            .map(|children| children.iter().map(|c| transform_item(c, total)).collect()),
    }
}

/// Reshape a `{ total, items }` treemap payload into a sorted tree.
pub fn transform_data(payload: &TreemapPayload) -> Treemap {
    let items: Vec<GroupTree> = payload
        .items
        .iter()
        .map(|item| transform_item(item, payload.total))
        .collect();
    Treemap {
        total: payload.total,
        items: sort_items(&items),
    }
}

fn department_node(record: &DepartmentRecord) -> GroupTree {
    GroupTree {
        name: record.name.clone(),
        id: record.slug.clone(),
        amount: record.amount,
        percentage: record.percentage_of_total,
        url: prefix_url(record.url.as_deref()),
        children: None,
    }
}

/// Check sphere and province of one record. `Ok` carries the province name
/// the record belongs to.
fn classify<'a>(
    record: &'a DepartmentRecord,
    provinces: &[&str],
) -> std::result::Result<&'a str, RejectReason> {
    if record.sphere.len() > 1 {
        return Err(RejectReason::MultipleSpheres(record.sphere.clone()));
    }
    let province = record
        .province
        .as_deref()
        .ok_or(RejectReason::MissingProvince)?;
    if let Some(sphere) = record.sphere.first() {
        if sphere != SPHERE_PROVINCIAL {
            return Err(RejectReason::UnrecognizedSphere {
                sphere: sphere.clone(),
                province: province.to_string(),
            });
        }
    }
    if !provinces.contains(&province) {
        return Err(RejectReason::UnrecognizedProvince(province.to_string()));
    }
    Ok(province)
}

/// Group department records into one bucket per province in `provinces`.
///
/// Every province gets a bucket, empty ones with `amount = 0`. Records that
/// cannot be placed are returned in `rejected` and never fail the grouping.
/// Bucket percentages are computed only for a positive `grand_total`.
pub fn add_province_to_object(
    records: &[DepartmentRecord],
    provinces: &[&str],
    grand_total: Option<f64>,
) -> ProvinceGrouping {
    let mut grouping = ProvinceGrouping::default();
    let mut placed: Vec<(&str, &DepartmentRecord)> = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        match classify(record, provinces) {
            Ok(province) => placed.push((province, record)),
            Err(reason) => {
                match reason {
                    RejectReason::MultipleSpheres(_) | RejectReason::UnrecognizedSphere { .. } => {
                        warn!("Excluding '{}' from provincial grouping: {}", record.slug, reason)
                    }
                    _ => debug!("Excluding '{}' from provincial grouping: {}", record.slug, reason),
                }
                grouping.rejected.push(Rejection::new(index, reason));
            }
        }
    }

    let grand_total = grand_total.filter(|t| *t > 0.0);
    for &province in provinces {
        let children: Vec<GroupTree> = placed
            .iter()
            .filter(|(p, _)| *p == province)
            .map(|(_, r)| department_node(r))
            .collect();
        let amount: f64 = children.iter().map(|c| c.amount).sum();
        grouping.buckets.insert(
            province.to_string(),
            ProvinceBucket {
                name: province.to_string(),
                amount,
                percentage: grand_total.map(|t| amount / t * 100.0),
                children: sort_items(&children),
            },
        );
    }

    debug!(
        "Grouped {} records into {} provinces, {} rejected",
        placed.len(),
        grouping.buckets.len(),
        grouping.rejected.len()
    );
    grouping
}
