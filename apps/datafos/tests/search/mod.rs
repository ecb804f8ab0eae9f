mod criteria;
mod pseudo_fields;
mod sorting;
