mod user;
pub use user::{UserEntity, UserEntityCreate};

mod subject;
pub use subject::{Subject, SubjectCreate, SubjectWithCourseCountRow};

mod course;
pub use course::{Course, CourseCreate, CourseWithModuleCountRow};

mod module;
pub use module::{Module, ModuleUpsert};

mod item;
pub use item::{Item, ItemKind, ItemPayload};

mod content;
pub use content::{Content, ContentWithItemRow};
