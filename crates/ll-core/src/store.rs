use crate::LifelineError;
use crate::assignments::AssignmentRepository;
use crate::communications::CommunicationRepository;
use crate::events::EventRepository;
use crate::profiles::ProfileRepository;
use crate::requests::RequestRepository;
use crate::sessions::SessionRepository;

pub trait Store {
    type Requests<'a>: RequestRepository
    where
        Self: 'a;
    type Profiles<'a>: ProfileRepository
    where
        Self: 'a;
    type Assignments<'a>: AssignmentRepository
    where
        Self: 'a;
    type Communications<'a>: CommunicationRepository
    where
        Self: 'a;
    type Sessions<'a>: SessionRepository
    where
        Self: 'a;
    type Events<'a>: EventRepository
    where
        Self: 'a;

    fn requests(&self) -> Self::Requests<'_>;
    fn profiles(&self) -> Self::Profiles<'_>;
    fn assignments(&self) -> Self::Assignments<'_>;
    fn communications(&self) -> Self::Communications<'_>;
    fn sessions(&self) -> Self::Sessions<'_>;
    fn events(&self) -> Self::Events<'_>;

    fn with_tx<F, T>(&self, f: F) -> Result<T, LifelineError>
    where
        F: FnOnce(&Self) -> Result<T, LifelineError>;
}
