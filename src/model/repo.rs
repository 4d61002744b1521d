#[derive(Debug, Clone)]
pub enum ResourceType {
    User,
    Subject,
    Course,
    Module,
    Content,
    Enrollment,
}

pub trait ResourceTyped {
    fn get_resource_type() -> ResourceType;
}
